//! Draft of the expense being composed in the create view.

use crate::{
    model::{ExpenseFields, ImageAttachment},
    preview::{Preview, PreviewRegistry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Reason,
    Amount,
    Date,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Self::Reason => "Reason",
            Self::Amount => "Amount",
            Self::Date => "Date",
        }
    }
}

/// Field values, attached receipt and its preview.
///
/// The preview is released whenever the image is replaced, detached or the
/// form is reset, so at most one is ever live per form.
#[derive(Debug, Default)]
pub struct FormState {
    fields: ExpenseFields,
    image: Option<ImageAttachment>,
    preview: Option<Preview>,
    previews: PreviewRegistry,
}

impl FormState {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            previews,
            ..Self::default()
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Reason => self.fields.reason = value,
            Field::Amount => self.fields.amount = value,
            Field::Date => self.fields.date = value,
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Reason => &self.fields.reason,
            Field::Amount => &self.fields.amount,
            Field::Date => &self.fields.date,
        }
    }

    pub fn fields(&self) -> &ExpenseFields {
        &self.fields
    }

    /// Stores the image and generates a fresh preview for it.
    pub fn attach_image(&mut self, image: ImageAttachment) -> &Preview {
        // Release the old preview before creating the new one.
        self.preview = None;
        let preview = self.previews.create(&image);
        self.image = Some(image);
        self.preview.insert(preview)
    }

    pub fn detach_image(&mut self) {
        self.preview = None;
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Clears every field, releases the preview and drops the image.
    pub fn reset(&mut self) {
        self.fields = ExpenseFields::default();
        self.detach_image();
    }

    pub fn is_pristine(&self) -> bool {
        self.fields == ExpenseFields::default() && self.image.is_none()
    }

    /// Copies of what a create request needs.
    pub fn submission(&self) -> (ExpenseFields, Option<ImageAttachment>) {
        (self.fields.clone(), self.image.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(name: &str) -> ImageAttachment {
        ImageAttachment::new(name, vec![1, 2, 3, 4]).unwrap()
    }

    #[test]
    fn set_field_merges_one_value() {
        let mut form = FormState::default();
        form.set_field(Field::Reason, "Lunch");
        form.set_field(Field::Amount, "500");
        form.set_field(Field::Reason, "Dinner");

        assert_eq!(form.field(Field::Reason), "Dinner");
        assert_eq!(form.field(Field::Amount), "500");
        assert_eq!(form.field(Field::Date), "");
    }

    #[test]
    fn repeated_attachments_keep_a_single_live_preview() {
        let registry = PreviewRegistry::default();
        let mut form = FormState::new(registry.clone());

        let first_ref = form.attach_image(image("a.png")).reference().to_string();
        let second_ref = form.attach_image(image("b.jpg")).reference().to_string();
        form.attach_image(image("c.gif"));

        assert_ne!(first_ref, second_ref);
        assert_eq!(registry.live(), 1);
        assert_eq!(form.image().unwrap().file_name(), "c.gif");
    }

    #[test]
    fn reset_clears_fields_image_and_preview() {
        let registry = PreviewRegistry::default();
        let mut form = FormState::new(registry.clone());
        form.set_field(Field::Reason, "Taxi");
        form.set_field(Field::Date, "2024-05-01");
        form.attach_image(image("r.png"));
        assert!(!form.is_pristine());

        form.reset();

        assert!(form.is_pristine());
        assert!(form.preview().is_none());
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn submission_copies_fields_and_image() {
        let mut form = FormState::default();
        form.set_field(Field::Reason, "Lunch");
        form.attach_image(image("r.png"));

        let (fields, image) = form.submission();
        assert_eq!(fields.reason, "Lunch");
        assert_eq!(image.unwrap().file_name(), "r.png");
        assert_eq!(form.field(Field::Reason), "Lunch");
    }
}
