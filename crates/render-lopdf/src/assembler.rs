use crate::canvas::PdfCanvas;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use mapsheet_layout::{LaidOutDocument, LayoutElement};
use mapsheet_render_core::{DocumentFinalizer, DrawSurface, RasterImage, RenderError, ResolvedFn};
use std::io::Write;

// Baseline sits this fraction of the line height below the line top
const BASELINE_RATIO: f32 = 0.8;

/// Assembles a laid-out document into a PDF.
///
/// Placeholders are reported through [`DocumentFinalizer::emit_flow`], after
/// which the overlay of any page can be drawn on until [`write_to`] is called.
///
/// [`write_to`]: PdfAssembler::write_to
#[derive(Debug)]
pub struct PdfAssembler {
    layout: LaidOutDocument,
    content: Vec<PdfCanvas>,
    overlays: Vec<PdfCanvas>,
}

impl PdfAssembler {
    pub fn new(layout: LaidOutDocument) -> Self {
        let pages = layout.page_count();
        Self {
            layout,
            content: (0..pages).map(|_| PdfCanvas::new("C")).collect(),
            overlays: (0..pages).map(|_| PdfCanvas::new("O")).collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }

    /// Build the PDF object graph and serialize it to `writer`.
    pub fn write_to<W: Write>(self, writer: &mut W) -> Result<(), RenderError> {
        let mut document = self.into_document()?;
        document
            .save_to(writer)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(())
    }

    fn into_document(self) -> Result<Document, RenderError> {
        let geometry = self.layout.geometry;
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut page_ids = Vec::with_capacity(self.content.len());
        for (content, overlay) in self.content.into_iter().zip(self.overlays) {
            let mut xobjects = Dictionary::new();
            let mut states = Dictionary::new();
            let mut streams = Vec::with_capacity(2);

            for mut canvas in [content, overlay] {
                let bytes = canvas.encode()?;
                for (name, image) in canvas.images.drain(..) {
                    let image_id = add_image(&mut document, image);
                    xobjects.set(name, image_id);
                }
                for (name, alpha) in canvas.opacities.drain(..) {
                    states.set(
                        name,
                        dictionary! { "Type" => "ExtGState", "ca" => alpha, "CA" => alpha },
                    );
                }
                if !bytes.is_empty() {
                    let stream_id = document.add_object(Stream::new(dictionary! {}, bytes));
                    streams.push(Object::Reference(stream_id));
                }
            }

            let resources = dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
                "ExtGState" => states,
            };
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), geometry.width.into(), geometry.height.into()],
                "Contents" => streams,
                "Resources" => resources,
            });
            page_ids.push(page_id);
        }

        let pages_dict = dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        };
        document.objects.insert(pages_id, Object::Dictionary(pages_dict));

        let catalog_id = document.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        document.trailer.set("Root", catalog_id);
        debug!("Assembled PDF with {} page(s)", page_ids.len());
        Ok(document)
    }
}

fn add_image(document: &mut Document, image: RasterImage) -> ObjectId {
    let width = i64::from(image.width);
    let height = i64::from(image.height);
    let smask = image.alpha.map(|alpha| {
        document.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ))
    });

    let mut dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width,
        "Height" => height,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
    };
    if let Some(smask_id) = smask {
        dict.set("SMask", smask_id);
    }
    document.add_object(Stream::new(dict, image.rgb))
}

impl DocumentFinalizer for PdfAssembler {
    fn emit_flow(&mut self, on_resolved: &mut ResolvedFn<'_>) -> Result<(), RenderError> {
        for (page_index, elements) in self.layout.pages.iter().enumerate() {
            let canvas = self
                .content
                .get_mut(page_index)
                .ok_or(RenderError::MissingPage(page_index))?;
            for positioned in elements {
                match &positioned.element {
                    LayoutElement::Text(line) => {
                        let baseline = positioned.rect.top() - positioned.rect.height * BASELINE_RATIO;
                        canvas.draw_text(positioned.rect.x, baseline, line.font_size, &line.content);
                    }
                    LayoutElement::Placeholder(id) => {
                        on_resolved(*id, positioned.rect, &mut *canvas)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn overlay(&mut self, page: usize) -> Result<&mut dyn DrawSurface, RenderError> {
        self.overlays
            .get_mut(page)
            .map(|canvas| canvas as &mut dyn DrawSurface)
            .ok_or(RenderError::MissingPage(page))
    }
}
