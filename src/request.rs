//! The unit of work for one video-generation call.

use crate::error::LectureError;

/// One lecture-generation request.
///
/// Created at request ingress, exclusively owned by the pipeline invocation,
/// never persisted directly. The PDF bytes must pass [`validate`] before any
/// stage runs.
///
/// [`validate`]: LectureRequest::validate
#[derive(Debug, Clone)]
pub struct LectureRequest {
    /// Lecture subject/title.
    pub title: String,
    /// Professor name.
    pub professor: String,
    /// Optional free-text description, fed to the narration generator as
    /// extra context.
    pub description: Option<String>,
    /// Raw PDF bytes. Read fully in memory; fine for moderate documents.
    pub pdf: Vec<u8>,
}

impl LectureRequest {
    /// Check required fields and the PDF magic bytes.
    ///
    /// Full structural validation (can the document actually be opened, does
    /// it have pages) happens in the extraction stage; this is the cheap
    /// pre-flight that keeps obviously bad input out of the pipeline.
    pub fn validate(&self) -> Result<(), LectureError> {
        if self.title.trim().is_empty() {
            return Err(LectureError::MissingField {
                field: "title".into(),
            });
        }
        if self.professor.trim().is_empty() {
            return Err(LectureError::MissingField {
                field: "professor".into(),
            });
        }
        if self.pdf.len() < 4 {
            return Err(LectureError::MissingField {
                field: "file".into(),
            });
        }
        if &self.pdf[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&self.pdf[..4]);
            return Err(LectureError::NotAPdf { magic });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> LectureRequest {
        LectureRequest {
            title: "Intro to Queues".into(),
            professor: "Prof. Kim".into(),
            description: None,
            pdf: b"%PDF-1.7 rest of document".to_vec(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut r = request();
        r.title = "   ".into();
        assert!(matches!(
            r.validate(),
            Err(LectureError::MissingField { field }) if field == "title"
        ));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut r = request();
        r.pdf = b"PK\x03\x04not a pdf".to_vec();
        assert!(matches!(r.validate(), Err(LectureError::NotAPdf { .. })));
    }

    #[test]
    fn empty_file_is_rejected() {
        let mut r = request();
        r.pdf = Vec::new();
        assert!(matches!(r.validate(), Err(LectureError::MissingField { .. })));
    }
}
