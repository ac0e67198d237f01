//! PDF Document writer

use crate::font::StandardFont;
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn gray() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum PageSize {
    #[default]
    A4,
    A4Landscape,
    Letter,
    LetterLandscape,
    /// Width and height in points
    Custom(f64, f64),
}

impl PageSize {
    /// (width, height) in points
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A4Landscape => (841.89, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::LetterLandscape => (792.0, 612.0),
            PageSize::Custom(w, h) => (w, h),
        }
    }
}

/// Entries for the document information dictionary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentInfo {
    pub producer: Option<String>,
    pub title: Option<String>,
    /// Already formatted as a PDF date (`D:YYYYMMDDHHmmss`)
    pub creation_date: Option<String>,
}

/// Objects reserved for one page; filled in when the document is assembled
#[derive(Debug, Clone, Copy)]
struct PageSlot {
    page_id: ObjectId,
    contents_id: ObjectId,
}

/// PDF document writer
///
/// Content is buffered per page and assembled into lopdf objects on
/// [`PdfDocument::save`] / [`PdfDocument::to_bytes`], so those can be called
/// more than once.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Root Pages node
    pages_id: ObjectId,
    /// Size applied to every page
    page_size: PageSize,
    /// Reserved objects per page (index 0 = page 1)
    pages: Vec<PageSlot>,
    /// Current font
    current_font: StandardFont,
    /// Current font size
    current_font_size: f32,
    /// Current text color
    current_text_color: Color,
    /// Font dictionaries already added (font -> object ID)
    font_objects: HashMap<StandardFont, ObjectId>,
    /// Fonts referenced per page (page number -> fonts)
    page_fonts: HashMap<usize, BTreeSet<StandardFont>>,
    /// Embedded images (data hash -> object ID, width, height)
    embedded_images: HashMap<u64, (ObjectId, u32, u32)>,
    /// Page image resources (page number -> resource name -> object ID)
    page_image_resources: HashMap<usize, BTreeMap<String, ObjectId>>,
    /// Next image resource number
    next_image_resource: u32,
    /// Buffered content operators per page (page number -> operators)
    page_content_buffer: HashMap<usize, Vec<u8>>,
    /// Document information dictionary entries
    info: DocumentInfo,
}

impl PdfDocument {
    /// Create an empty document; pages are added with [`PdfDocument::add_page`]
    pub fn new(page_size: PageSize) -> Self {
        let mut inner = Document::with_version("1.7");
        let pages_id = inner.new_object_id();
        let catalog_id = inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        inner.trailer.set("Root", catalog_id);

        Self {
            inner,
            pages_id,
            page_size,
            pages: Vec::new(),
            current_font: StandardFont::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            font_objects: HashMap::new(),
            page_fonts: HashMap::new(),
            embedded_images: HashMap::new(),
            page_image_resources: HashMap::new(),
            next_image_resource: 1,
            page_content_buffer: HashMap::new(),
            info: DocumentInfo::default(),
        }
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// (width, height) of every page in points
    pub fn page_dimensions(&self) -> (f64, f64) {
        self.page_size.dimensions()
    }

    /// Append a blank page and return its number (1-indexed)
    pub fn add_page(&mut self) -> usize {
        let page_id = self.inner.new_object_id();
        let contents_id = self.inner.new_object_id();
        self.pages.push(PageSlot {
            page_id,
            contents_id,
        });
        self.pages.len()
    }

    /// Set the document information entries written on save
    pub fn set_info(&mut self, info: DocumentInfo) {
        self.info = info;
    }

    /// Set the current font and size
    pub fn set_font(&mut self, font: StandardFont, size: f32) {
        self.current_font = font;
        self.current_font_size = size;
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Insert text at a specific position
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X coordinate in points (anchor for the alignment)
    /// * `y` - Baseline Y coordinate in points (from top)
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        self.check_page(page)?;

        if text.is_empty() {
            return Ok(());
        }

        let width = self
            .current_font
            .text_width_points(text, self.current_font_size);
        let start_x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let pdf_y = self.page_height() - y;

        self.page_fonts
            .entry(page)
            .or_default()
            .insert(self.current_font);

        let ctx = TextRenderContext {
            font_name: self.current_font.resource_name(),
            font_size: self.current_font_size,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(text, start_x, pdf_y, &ctx);
        self.buffer_content(page, &operators);

        Ok(())
    }

    /// Fill a rectangle whose top-left corner is at (`x`, `y`)
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
    ) -> Result<()> {
        self.check_page(page)?;
        let pdf_y = self.page_height() - y - height;
        let ops = format!(
            "q\n{} {} {} rg\n{x:.2} {pdf_y:.2} {width:.2} {height:.2} re\nf\nQ\n",
            color.r, color.g, color.b
        );
        self.buffer_content(page, ops.as_bytes());
        Ok(())
    }

    /// Stroke the outline of a rectangle whose top-left corner is at (`x`, `y`)
    #[allow(clippy::too_many_arguments)]
    pub fn stroke_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        self.check_page(page)?;
        let pdf_y = self.page_height() - y - height;
        let ops = format!(
            "q\n{} {} {} RG\n{line_width:.2} w\n{x:.2} {pdf_y:.2} {width:.2} {height:.2} re\nS\nQ\n",
            color.r, color.g, color.b
        );
        self.buffer_content(page, ops.as_bytes());
        Ok(())
    }

    /// Draw a straight line between two points (top-origin coordinates)
    #[allow(clippy::too_many_arguments)]
    pub fn draw_line(
        &mut self,
        page: usize,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Color,
        line_width: f64,
    ) -> Result<()> {
        self.check_page(page)?;
        let height = self.page_height();
        let ops = format!(
            "q\n{} {} {} RG\n{line_width:.2} w\n{x1:.2} {:.2} m\n{x2:.2} {:.2} l\nS\nQ\n",
            color.r,
            color.g,
            color.b,
            height - y1,
            height - y2
        );
        self.buffer_content(page, ops.as_bytes());
        Ok(())
    }

    /// Pixel dimensions of an image, embedding it if not seen before
    ///
    /// Layout code uses this to size an image before placing it; the
    /// embedded object is reused by the later insert.
    pub fn image_dimensions(&mut self, data: &[u8]) -> Result<(u32, u32)> {
        let (_, width, height) = self.embed_image(data)?;
        Ok((width, height))
    }

    /// Insert an image stretched to the given box
    ///
    /// `x`/`y` is the top-left corner.
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.check_page(page)?;

        let (object_id, _, _) = self.embed_image(data)?;
        let resource_name = self.image_resource_name(page, object_id);
        let pdf_y = self.page_height() - y - height;

        let operators = generate_image_operators(&resource_name, x, pdf_y, width, height);
        self.buffer_content(page, &operators);
        Ok(())
    }

    /// Save the document to a file
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.assemble()?;
        self.inner
            .save(path)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(())
    }

    /// Save the document to bytes
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.assemble()?;
        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;
        Ok(buffer)
    }

    fn page_height(&self) -> f64 {
        self.page_size.dimensions().1
    }

    fn check_page(&self, page: usize) -> Result<()> {
        if page == 0 || page > self.pages.len() {
            return Err(PdfError::InvalidPage(page, self.pages.len()));
        }
        Ok(())
    }

    /// Buffer content operators for a page (written at save time)
    fn buffer_content(&mut self, page: usize, content: &[u8]) {
        self.page_content_buffer
            .entry(page)
            .or_default()
            .extend_from_slice(content);
    }

    /// Add an image XObject once per distinct image
    fn embed_image(&mut self, data: &[u8]) -> Result<(ObjectId, u32, u32)> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        if let Some(entry) = self.embedded_images.get(&data_hash) {
            return Ok(*entry);
        }

        let xobject = ImageXObject::from_bytes(data)
            .map_err(|e| PdfError::ImageError(format!("Failed to create image XObject: {e}")))?;
        let object_id = self.inner.add_object(xobject.to_pdf_stream());
        let entry = (object_id, xobject.width, xobject.height);
        self.embedded_images.insert(data_hash, entry);

        Ok(entry)
    }

    /// Resource name (e.g., "Im1") for an image on a page
    fn image_resource_name(&mut self, page: usize, object_id: ObjectId) -> String {
        let resources = self.page_image_resources.entry(page).or_default();
        if let Some((name, _)) = resources.iter().find(|(_, id)| **id == object_id) {
            return name.clone();
        }

        let name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        resources.insert(name.clone(), object_id);
        name
    }

    fn font_object(&mut self, font: StandardFont) -> ObjectId {
        if let Some(id) = self.font_objects.get(&font) {
            return *id;
        }
        let id = self.inner.add_object(font.to_pdf_dictionary());
        self.font_objects.insert(font, id);
        id
    }

    /// Write page, content, resource and info objects into the lopdf document
    fn assemble(&mut self) -> Result<()> {
        let (width, height) = self.page_size.dimensions();
        let mut kids = Vec::with_capacity(self.pages.len());

        for (index, slot) in self.pages.clone().into_iter().enumerate() {
            let page = index + 1;

            let mut font_dict = Dictionary::new();
            let fonts: Vec<StandardFont> = self
                .page_fonts
                .get(&page)
                .map(|set| set.iter().copied().collect())
                .unwrap_or_default();
            for font in fonts {
                let id = self.font_object(font);
                font_dict.set(font.resource_name(), Object::Reference(id));
            }

            let mut xobject_dict = Dictionary::new();
            if let Some(images) = self.page_image_resources.get(&page) {
                for (name, id) in images {
                    xobject_dict.set(name.as_bytes(), Object::Reference(*id));
                }
            }

            let mut resources = Dictionary::new();
            if !font_dict.is_empty() {
                resources.set("Font", Object::Dictionary(font_dict));
            }
            if !xobject_dict.is_empty() {
                resources.set("XObject", Object::Dictionary(xobject_dict));
            }

            let content = self
                .page_content_buffer
                .get(&page)
                .cloned()
                .unwrap_or_default();
            self.inner.objects.insert(
                slot.contents_id,
                Object::Stream(Stream::new(Dictionary::new(), content)),
            );

            let page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
                "Resources" => resources,
                "Contents" => slot.contents_id,
            };
            self.inner
                .objects
                .insert(slot.page_id, Object::Dictionary(page_dict));
            kids.push(Object::Reference(slot.page_id));
        }

        let count = kids.len() as i64;
        self.inner.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        self.write_info();
        Ok(())
    }

    fn write_info(&mut self) {
        let mut info = Dictionary::new();
        if let Some(producer) = &self.info.producer {
            info.set("Producer", Object::string_literal(producer.as_str()));
        }
        if let Some(title) = &self.info.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        if let Some(date) = &self.info.creation_date {
            info.set("CreationDate", Object::string_literal(date.as_str()));
        }
        if info.is_empty() {
            return;
        }

        match self.inner.trailer.get(b"Info").and_then(Object::as_reference) {
            Ok(id) => {
                self.inner.objects.insert(id, Object::Dictionary(info));
            }
            Err(_) => {
                let id = self.inner.add_object(info);
                self.inner.trailer.set("Info", id);
            }
        }
    }
}
