use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use uuid::Uuid;

use crate::model::ImageAttachment;

/// Hands out local preview references and counts the live ones.
///
/// A reference is released when its [`Preview`] is dropped or explicitly
/// [`released`](Preview::release).
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn create(&self, image: &ImageAttachment) -> Preview {
        self.live.fetch_add(1, Ordering::SeqCst);
        Preview {
            reference: format!("blob:preview/{}", Uuid::new_v4()),
            label: format!("{} ({})", image.file_name(), human_size(image.len())),
            live: Arc::clone(&self.live),
        }
    }

    /// Number of previews created and not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Preview {
    reference: String,
    label: String,
    live: Arc<AtomicUsize>,
}

impl Preview {
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// File name and size, as shown under the form.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn release(self) {}
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(reference = %self.reference, "preview released");
    }
}

fn human_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KIB {
        format!("{bytes} B")
    } else if bytes_f < KIB * KIB {
        format!("{:.1} KiB", bytes_f / KIB)
    } else {
        format!("{:.1} MiB", bytes_f / (KIB * KIB))
    }
}
