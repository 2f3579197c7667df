//! Itinerary document rendering
//!
//! Thin adapter over the PDF writer: walks a normalized itinerary and emits a
//! paginated document (title, basic info, budget table, day sections, advisory
//! destination images). Every string goes through the sanitizer once more
//! before emission, guarding against callers that bypass normalization. If
//! full rendering fails for any reason a minimal fixed document is emitted
//! instead, so this module always returns bytes.

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::{debug, error};

use crate::models::{DestinationImage, Itinerary, TripRequest};
use crate::sanitize::sanitize;
use crate::{Result, VoyageMindError};

const PAGE_WIDTH_MM: f64 = 210.0;
const PAGE_HEIGHT_MM: f64 = 297.0;
const MARGIN_MM: f64 = 15.0;
const BOTTOM_MARGIN_MM: f64 = 20.0;
const CONTENT_WIDTH_MM: f64 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
const POINT_TO_MM: f64 = 0.352_778;
/// Rough average glyph width for Helvetica, as a fraction of the font size
const GLYPH_WIDTH_EM: f64 = 0.5;

/// Render an itinerary to PDF bytes. Never fails: a render error degrades to
/// the minimal document, image problems are skipped silently.
#[must_use]
pub fn render(itinerary: &Itinerary, trip: &TripRequest, images: &[DestinationImage]) -> Vec<u8> {
    match try_render(itinerary, trip, images) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Itinerary rendering failed, emitting minimal document: {e}");
            minimal_document(trip)
        }
    }
}

fn try_render(
    itinerary: &Itinerary,
    trip: &TripRequest,
    images: &[DestinationImage],
) -> Result<Vec<u8>> {
    let mut writer = DocumentWriter::new(&itinerary.title)?;

    writer.centered_line(&itinerary.title, FontStyle::Bold, 16.0);
    writer.blank(6.0);

    writer.line(&format!("Destination: {}", trip.destination), FontStyle::Regular, 12.0);
    writer.line(&format!("Duration: {} days", trip.days()), FontStyle::Regular, 12.0);
    writer.line(&format!("Budget: Rs. {}", trip.budget), FontStyle::Regular, 12.0);
    writer.blank(8.0);

    if !itinerary.budget_breakdown.is_empty() {
        writer.line("Budget Breakdown", FontStyle::Bold, 14.0);
        writer.blank(2.0);
        for (category, amount) in itinerary.budget_breakdown.iter() {
            writer.line(
                &format!("{}: {}", capitalize(category), amount),
                FontStyle::Regular,
                10.0,
            );
        }
        writer.blank(5.0);
    }

    writer.line("Daily Itinerary", FontStyle::Bold, 14.0);
    writer.blank(4.0);

    for day in &itinerary.days {
        writer.line(&format!("Day {}: {}", day.day, day.date), FontStyle::Bold, 12.0);
        writer.section("Activities", &day.activities);
        writer.section("Accommodation", &day.accommodation);
        writer.section("Meals", &day.meals);
        writer.section("Transportation", &day.transportation);
        writer.section("Highlights", &day.highlights);
        // Tips get a visually distinct style but identical sanitization
        writer.line(&format!("Tip: {}", day.tips), FontStyle::Oblique, 10.0);
        writer.blank(8.0);
    }

    writer.append_images(images);
    writer.finish()
}

/// Fixed-content fallback document built from four scalar fields only.
fn minimal_document(trip: &TripRequest) -> Vec<u8> {
    let (doc, page, layer) = PdfDocument::new(
        "Travel Itinerary",
        Mm(PAGE_WIDTH_MM as f32),
        Mm(PAGE_HEIGHT_MM as f32),
        "Layer 1",
    );

    let fonts = (
        doc.add_builtin_font(BuiltinFont::HelveticaBold),
        doc.add_builtin_font(BuiltinFont::Helvetica),
    );
    let (Ok(bold), Ok(regular)) = fonts else {
        error!("Minimal document font setup failed");
        return Vec::new();
    };

    let layer = doc.get_page(page).get_layer(layer);
    layer.use_text("Travel Itinerary", 16.0, Mm(75.0), Mm(270.0), &bold);
    layer.use_text(
        sanitize(&format!("Destination: {}", trip.destination)),
        12.0,
        Mm(MARGIN_MM as f32),
        Mm(250.0),
        &regular,
    );
    layer.use_text(
        format!("Duration: {} days", trip.days()),
        12.0,
        Mm(MARGIN_MM as f32),
        Mm(242.0),
        &regular,
    );
    layer.use_text(
        sanitize(&format!("Budget: Rs. {}", trip.budget)),
        12.0,
        Mm(MARGIN_MM as f32),
        Mm(234.0),
        &regular,
    );

    doc.save_to_bytes().unwrap_or_else(|e| {
        error!("Minimal document serialization failed: {e}");
        Vec::new()
    })
}

#[derive(Clone, Copy)]
enum FontStyle {
    Regular,
    Bold,
    Oblique,
}

/// Cursor-tracking writer over a PDF document: top-down text placement with
/// word wrap and automatic page breaks.
struct DocumentWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
    /// Current baseline, in mm from the page bottom
    y: f64,
}

impl DocumentWriter {
    fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            sanitize(title),
            Mm(PAGE_WIDTH_MM as f32),
            Mm(PAGE_HEIGHT_MM as f32),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| VoyageMindError::render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| VoyageMindError::render(e.to_string()))?;
        let oblique = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| VoyageMindError::render(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            oblique,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        })
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Oblique => &self.oblique,
        }
    }

    /// Start a new page when fewer than `needed` mm remain above the bottom
    /// margin.
    fn ensure_space(&mut self, needed: f64) {
        if self.y - needed < BOTTOM_MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM as f32), Mm(PAGE_HEIGHT_MM as f32), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
    }

    /// Emit sanitized, word-wrapped text at the left margin.
    fn line(&mut self, text: &str, style: FontStyle, size: f64) {
        self.wrapped_text(text, style, size, MARGIN_MM);
    }

    /// Emit sanitized text horizontally centered (single line, approximate
    /// metrics for the built-in face).
    fn centered_line(&mut self, text: &str, style: FontStyle, size: f64) {
        let clean = sanitize(text);
        let width_mm = clean.chars().count() as f64 * size * POINT_TO_MM * GLYPH_WIDTH_EM;
        let x = ((PAGE_WIDTH_MM - width_mm) / 2.0).max(MARGIN_MM);
        let height = line_height(size);
        self.ensure_space(height);
        self.y -= height;
        self.layer
            .use_text(clean, size as f32, Mm(x as f32), Mm(self.y as f32), self.font(style));
    }

    /// A labeled day section: bold label line, regular content body.
    fn section(&mut self, label: &str, content: &str) {
        self.line(&format!("{label}:"), FontStyle::Bold, 10.0);
        self.line(content, FontStyle::Regular, 10.0);
        self.blank(2.0);
    }

    fn blank(&mut self, mm: f64) {
        self.y -= mm;
    }

    fn wrapped_text(&mut self, text: &str, style: FontStyle, size: f64, x: f64) {
        let clean = sanitize(text);
        let max_chars = chars_per_line(size);
        let height = line_height(size);
        for segment in clean.split('\n') {
            for wrapped in wrap_text(segment, max_chars) {
                self.ensure_space(height);
                self.y -= height;
                self.layer
                    .use_text(wrapped, size as f32, Mm(x as f32), Mm(self.y as f32), self.font(style));
            }
        }
    }

    /// Best-effort image embedding: a malformed image is skipped, never fatal.
    fn append_images(&mut self, images: &[DestinationImage]) {
        for image in images {
            if self.draw_image(image).is_none() {
                debug!("Skipping undecodable destination image {}", image.source_url);
            }
        }
    }

    fn draw_image(&mut self, image: &DestinationImage) -> Option<()> {
        const DPI: f64 = 300.0;
        const MAX_IMAGE_HEIGHT_MM: f64 = 90.0;

        let decoded = printpdf::image_crate::load_from_memory(&image.bytes).ok()?;
        // Flatten to RGB8; the PDF image object carries no alpha channel
        let rgb = printpdf::image_crate::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let (px_w, px_h) = (f64::from(rgb.width()), f64::from(rgb.height()));
        if px_w < 1.0 || px_h < 1.0 {
            return None;
        }

        let natural_w_mm = px_w * 25.4 / DPI;
        let natural_h_mm = px_h * 25.4 / DPI;
        let scale = (CONTENT_WIDTH_MM / natural_w_mm)
            .min(MAX_IMAGE_HEIGHT_MM / natural_h_mm)
            .min(1.0);
        let height_mm = natural_h_mm * scale;

        self.ensure_space(height_mm + 6.0);
        self.y -= height_mm;
        let pdf_image = Image::from_dynamic_image(&rgb);
        pdf_image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN_MM as f32)),
                translate_y: Some(Mm(self.y as f32)),
                scale_x: Some(scale as f32),
                scale_y: Some(scale as f32),
                dpi: Some(DPI as f32),
                ..Default::default()
            },
        );
        self.y -= 6.0;
        Some(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| VoyageMindError::render(e.to_string()))
    }
}

fn line_height(size: f64) -> f64 {
    size * POINT_TO_MM * 1.5
}

fn chars_per_line(size: f64) -> usize {
    (CONTENT_WIDTH_MM / (size * POINT_TO_MM * GLYPH_WIDTH_EM)).max(1.0) as usize
}

/// Greedy word wrap. Words longer than the limit get a line of their own.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
