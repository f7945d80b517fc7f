//! Renders [`ReportBlock`]s to a PDF with genpdf.
//!
//! Fonts are loaded from the configured font directory: an `Arial` family when
//! present, `LiberationSans` otherwise. An optional logo is scaled to fit a small
//! header box, flattened onto white and embedded through a temporary PNG.

use super::content::{ReportBlock, TextSegment, TextStyle};
use genpdf::elements::{Break, Image as PdfImage, LinearLayout, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

const MARGIN_MM: i32 = 10;
const BODY_FONT_SIZE: u8 = 10;
const TITLE_FONT_SIZE: u8 = 18;
const HEADING_FONT_SIZE: u8 = 13;
const IMAGE_DPI: f64 = 150.0;
/// Largest logo edge, in CSS pixels at 96 per inch.
const LOGO_MAX_CSS_PX: f64 = 160.0;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not load report fonts from {dir}: {source}")]
    Font {
        dir: String,
        source: genpdf::error::Error,
    },
    #[error("could not render report: {0}")]
    Render(#[from] genpdf::error::Error),
    #[error("could not read logo: {0}")]
    Logo(#[from] image::ImageError),
    #[error("could not encode logo: {0}")]
    Png(#[from] png::EncodingError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Writes the report to `output`, creating its directory if needed.
pub(crate) fn render(
    blocks: &[ReportBlock],
    font_dir: &Path,
    logo: Option<&Path>,
    output: &Path,
) -> Result<(), ReportError> {
    let mut doc = configure_document(font_dir)?;

    // Keeps the temporary logo file alive until rendering finishes.
    let mut temp_files: Vec<NamedTempFile> = Vec::new();
    if let Some(logo) = logo {
        push_logo(logo, &mut temp_files, &mut doc)?;
    }

    for block in blocks {
        match block {
            ReportBlock::Title(text) => {
                doc.set_title(text.clone());
                doc.push(Paragraph::new(StyledString::new(
                    text.clone(),
                    Style::new().bold().with_font_size(TITLE_FONT_SIZE),
                )));
            }
            ReportBlock::Heading(text) => doc.push(Paragraph::new(StyledString::new(
                text.clone(),
                Style::new().bold().with_font_size(HEADING_FONT_SIZE),
            ))),
            ReportBlock::Line(segments) => {
                let mut p = Paragraph::new("");
                push_segments_into_paragraph(&mut p, segments);
                doc.push(p);
            }
            ReportBlock::ListItem(segments) => handle_list_item(&mut doc, segments),
            ReportBlock::Break => doc.push(Break::new(1)),
        }
    }

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out_file = std::fs::File::create(output)?;
    doc.render(&mut out_file)?;
    Ok(())
}

fn load_font(font_dir: &Path) -> Result<FontFamily<FontData>, ReportError> {
    if let Ok(family) = genpdf::fonts::from_files(font_dir, "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files(font_dir, "LiberationSans", None).map_err(|source| {
        ReportError::Font {
            dir: font_dir.display().to_string(),
            source,
        }
    })
}

fn configure_document(font_dir: &Path) -> Result<Document, ReportError> {
    let mut doc = Document::new(load_font(font_dir)?);
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.15);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

fn push_segments_into_paragraph(p: &mut Paragraph, segments: &[TextSegment]) {
    for seg in segments {
        let style = match seg.style {
            TextStyle::Regular => Style::new(),
            TextStyle::Bold => Style::new().bold(),
            TextStyle::Italic => Style::new().italic(),
        };
        p.push(StyledString::new(seg.text.clone(), style));
    }
}

fn handle_list_item(doc: &mut Document, segments: &[TextSegment]) {
    let mut p = Paragraph::new("");
    p.push(StyledString::new("• ", Style::new()));
    push_segments_into_paragraph(&mut p, segments);
    let mut layout = LinearLayout::vertical();
    layout.push(p);
    doc.push(layout);
}

/// Scales the logo to fit the header box keeping its aspect ratio and embeds it.
fn push_logo(
    path: &Path,
    temp_files: &mut Vec<NamedTempFile>,
    doc: &mut Document,
) -> Result<(), ReportError> {
    let img = image::open(path)?;
    let (orig_w, orig_h) = img.dimensions();
    let max_px = LOGO_MAX_CSS_PX * IMAGE_DPI / 96.0;
    let scale = (max_px / orig_w as f64)
        .min(max_px / orig_h as f64)
        .min(1.0);

    let resized: DynamicImage = if scale >= 1.0 {
        img
    } else {
        let new_w = (orig_w as f64 * scale).max(1.0).round() as u32;
        let new_h = (orig_h as f64 * scale).max(1.0).round() as u32;
        img.resize(new_w, new_h, FilterType::Lanczos3)
    };

    // genpdf cannot embed an alpha channel.
    let rgba = resized.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut background = image::RgbaImage::from_pixel(w, h, image::Rgba([255, 255, 255, 255]));
    image::imageops::overlay(&mut background, &rgba, 0, 0);
    let raw = DynamicImage::ImageRgba8(background).to_rgb8().into_raw();

    let mut tmp = NamedTempFile::new()?;
    {
        let mut encoder = PngEncoder::new(tmp.as_file_mut(), w, h);
        encoder.set_color(PngColorType::Rgb);
        encoder.set_depth(PngBitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&raw)?;
    }

    let mut logo = PdfImage::from_path(tmp.path())?;
    logo.set_dpi(IMAGE_DPI);
    temp_files.push(tmp);
    doc.push(logo);
    doc.push(Break::new(1));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fonts_are_reported_with_their_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        let err = render(
            &[ReportBlock::Title("Report".to_string())],
            &dir.path().join("no-fonts"),
            None,
            &output,
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::Font { .. }));
        assert!(err.to_string().contains("no-fonts"));
        assert!(!output.exists());
    }

    /// Lays a system sans-serif family out under the `LiberationSans` names.
    /// `None` when the host has neither Liberation nor DejaVu installed.
    fn font_dir(into: &Path) -> Option<()> {
        let sources = [
            (
                "/usr/share/fonts/truetype/liberation",
                [
                    "LiberationSans-Regular.ttf",
                    "LiberationSans-Bold.ttf",
                    "LiberationSans-Italic.ttf",
                    "LiberationSans-BoldItalic.ttf",
                ],
            ),
            (
                "/usr/share/fonts/truetype/dejavu",
                [
                    "DejaVuSans.ttf",
                    "DejaVuSans-Bold.ttf",
                    "DejaVuSans-Oblique.ttf",
                    "DejaVuSans-BoldOblique.ttf",
                ],
            ),
        ];
        let targets = ["Regular", "Bold", "Italic", "BoldItalic"];
        let (dir, files) = sources
            .iter()
            .find(|(dir, files)| files.iter().all(|f| Path::new(dir).join(f).exists()))?;
        for (file, variant) in files.iter().zip(targets) {
            std::fs::copy(
                Path::new(dir).join(file),
                into.join(format!("LiberationSans-{}.ttf", variant)),
            )
            .ok()?;
        }
        Some(())
    }

    #[test]
    fn renders_blocks_and_logo_to_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = dir.path().join("fonts");
        std::fs::create_dir_all(&fonts).unwrap();
        if font_dir(&fonts).is_none() {
            eprintln!("no system fonts found; skipping PDF rendering");
            return;
        }

        let logo = dir.path().join("logo.png");
        image::RgbaImage::from_pixel(400, 200, image::Rgba([20, 90, 160, 128]))
            .save(&logo)
            .unwrap();

        let blocks = [
            ReportBlock::Title("Document compliance".to_string()),
            ReportBlock::Heading("Ana Perez".to_string()),
            ReportBlock::Line(vec![
                TextSegment {
                    text: "Completion: ".to_string(),
                    style: TextStyle::Bold,
                },
                TextSegment {
                    text: "50%".to_string(),
                    style: TextStyle::Regular,
                },
            ]),
            ReportBlock::ListItem(vec![TextSegment {
                text: "Passport: missing".to_string(),
                style: TextStyle::Italic,
            }]),
            ReportBlock::Break,
        ];
        let output = dir.path().join("reports").join("out.pdf");
        render(&blocks, &fonts, Some(&logo), &output).unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
