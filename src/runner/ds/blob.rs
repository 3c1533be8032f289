//! Binary payload whose content can only be read asynchronously.

use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures::future::LocalBoxFuture;
use futures::FutureExt;

pub struct Blob {
    mime_type: String,
    data: Arc<[u8]>,
}

impl Blob {
    pub fn new(mime_type: &str, data: Vec<u8>) -> Self {
        Blob {
            mime_type: mime_type.to_string(),
            data: Arc::from(data),
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Reads the payload as a `data:` URL with base64 content.
    pub fn read_as_data_url(&self) -> LocalBoxFuture<'static, String> {
        let mime_type = self.mime_type.clone();
        let data = self.data.clone();
        async move { format!("data:{};base64,{}", mime_type, STANDARD.encode(&data[..])) }
            .boxed_local()
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({}, {} bytes)", self.mime_type, self.data.len())
    }
}
