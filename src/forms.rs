use std::io;

use file_format::FileFormat;
use itertools::Itertools;
use rocket::{form::FromForm, fs::TempFile, tokio::fs};
use serde::{Serialize, Serializer};

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
pub const INVALID_IMAGE: &str =
    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

/// Field-level validation messages, serialized as `{"field": ["message", ...]}`
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(Vec<(&'static str, String)>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push((field, message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|(f, _)| *f == field)
    }
}

impl Serialize for FormErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().cloned().into_group_map())
    }
}

/// Returns trimmed value of a required text field
fn required<'a>(
    value: Option<&'a str>,
    field: &'static str,
    errors: &mut FormErrors,
) -> Option<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.add(field, REQUIRED);
            None
        }
    }
}

/// Submitted post, from either `application/x-www-form-urlencoded` or `multipart/form-data`
#[derive(FromForm)]
pub struct PostForm<'r> {
    pub text: Option<String>,
    /// ID of group, empty for no group
    pub group: Option<String>,
    pub image: Option<TempFile<'r>>,
}

/// Post fields that passed validation which doesn't need database
#[derive(Debug, PartialEq, Eq)]
pub struct CleanPost {
    pub text: String,
    pub group: Option<i64>,
    /// Format detected from content of the uploaded image
    pub image: Option<FileFormat>,
}

impl<'r> PostForm<'r> {
    /// Checks every field. Uploaded image is read back from disk to detect its format.
    pub async fn clean(&self) -> io::Result<Result<CleanPost, FormErrors>> {
        let mut errors = FormErrors::default();

        let text = required(self.text.as_deref(), "text", &mut errors);

        let group = match self.group.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<i64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    errors.add("group", INVALID_CHOICE);
                    None
                }
            },
        };

        let image = match self.image() {
            Some(file) => {
                let format = sniff_image(file).await?;
                if format.is_none() {
                    errors.add("image", INVALID_IMAGE);
                }
                format
            }
            None => None,
        };

        Ok(match text {
            Some(text) if errors.is_empty() => Ok(CleanPost {
                text: text.to_string(),
                group,
                image,
            }),
            _ => Err(errors),
        })
    }

    /// Uploaded image, if any was attached
    pub fn image(&self) -> Option<&TempFile<'r>> {
        self.image.as_ref().filter(|file| file.len() > 0)
    }

    pub fn image_mut(&mut self) -> Option<&mut TempFile<'r>> {
        self.image.as_mut().filter(|file| file.len() > 0)
    }
}

/// Format of an uploaded file, if its content is one of accepted images.
/// Content type sent by the client is ignored.
async fn sniff_image(file: &TempFile<'_>) -> io::Result<Option<FileFormat>> {
    let Some(path) = file.path() else {
        return Ok(None);
    };

    let content = fs::read(path).await?;

    Ok(image_format(&content))
}

fn image_format(content: &[u8]) -> Option<FileFormat> {
    match FileFormat::from_bytes(content) {
        format @ (FileFormat::GraphicsInterchangeFormat
        | FileFormat::PortableNetworkGraphics
        | FileFormat::AnimatedPortableNetworkGraphics
        | FileFormat::JointPhotographicExpertsGroup
        | FileFormat::Webp
        | FileFormat::Av1ImageFileFormat
        | FileFormat::WindowsBitmap) => Some(format),
        _ => None,
    }
}

#[derive(FromForm)]
pub struct CommentForm {
    pub text: Option<String>,
}

impl CommentForm {
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();

        required(self.text.as_deref(), "text", &mut errors)
            .map(str::to_string)
            .ok_or(errors)
    }
}

#[derive(FromForm)]
pub struct GroupForm {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct CleanGroup {
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl GroupForm {
    pub fn clean(&self) -> Result<CleanGroup, FormErrors> {
        let mut errors = FormErrors::default();

        let title = required(self.title.as_deref(), "title", &mut errors);
        if let Some(title) = title {
            if title.chars().count() > entity::group::TITLE_MAX_LEN {
                errors.add(
                    "title",
                    format!(
                        "Ensure this value has at most {} characters.",
                        entity::group::TITLE_MAX_LEN
                    ),
                );
            }
        }

        let slug = required(self.slug.as_deref(), "slug", &mut errors);
        if let Some(slug) = slug {
            if !entity::group::is_valid_slug(slug) {
                errors.add(
                    "slug",
                    "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
                );
            }
        }

        let description = required(self.description.as_deref(), "description", &mut errors);

        match (title, slug, description) {
            (Some(title), Some(slug), Some(description)) if errors.is_empty() => Ok(CleanGroup {
                title: title.to_string(),
                slug: slug.to_string(),
                description: description.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_form(text: Option<&str>, group: Option<&str>) -> PostForm<'static> {
        PostForm {
            text: text.map(str::to_string),
            group: group.map(str::to_string),
            image: None,
        }
    }

    async fn clean(form: PostForm<'_>) -> Result<CleanPost, FormErrors> {
        form.clean().await.unwrap()
    }

    #[rocket::async_test]
    async fn post_text_is_required() {
        for text in [None, Some(""), Some("   \n")] {
            let errors = clean(post_form(text, None)).await.unwrap_err();

            assert!(errors.has("text"));
        }
    }

    #[rocket::async_test]
    async fn post_text_is_trimmed() {
        let post = clean(post_form(Some("  hello  "), Some(""))).await.unwrap();

        assert_eq!(
            post,
            CleanPost {
                text: "hello".into(),
                group: None,
                image: None,
            }
        );
    }

    #[rocket::async_test]
    async fn post_group_must_be_numeric() {
        let errors = clean(post_form(Some("text"), Some("abc"))).await.unwrap_err();

        assert!(errors.has("group"));
        assert!(!errors.has("text"));

        let post = clean(post_form(Some("text"), Some("7"))).await.unwrap();
        assert_eq!(post.group, Some(7));
    }

    #[test]
    fn image_format_comes_from_content() {
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";
        let png = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

        assert_eq!(image_format(gif), Some(FileFormat::GraphicsInterchangeFormat));
        assert_eq!(image_format(png), Some(FileFormat::PortableNetworkGraphics));
        assert_eq!(image_format(b"this is not a gif at all"), None);
        assert_eq!(image_format(b"%PDF-1.7\n"), None);
        assert_eq!(image_format(b""), None);
    }

    #[test]
    fn errors_are_grouped_by_field() {
        let mut errors = FormErrors::default();
        errors.add("slug", "first");
        errors.add("slug", "second");
        errors.add("title", REQUIRED);

        let value = serde_json::to_value(&errors).unwrap();

        assert_eq!(value["slug"], serde_json::json!(["first", "second"]));
        assert_eq!(value["title"], serde_json::json!([REQUIRED]));
    }

    #[test]
    fn comment_text_is_required() {
        assert!(CommentForm { text: Some(" ".into()) }.clean().is_err());
        assert_eq!(
            CommentForm {
                text: Some("nice".into())
            }
            .clean()
            .unwrap(),
            "nice"
        );
    }

    #[test]
    fn group_slug_and_title_are_checked() {
        let form = GroupForm {
            title: Some("x".repeat(201)),
            slug: Some("not a slug".into()),
            description: Some("desc".into()),
        };
        let errors = form.clean().unwrap_err();

        assert!(errors.has("title"));
        assert!(errors.has("slug"));
        assert!(!errors.has("description"));

        let form = GroupForm {
            title: Some("Cats".into()),
            slug: Some("cats".into()),
            description: Some("About cats".into()),
        };
        assert_eq!(form.clean().unwrap().slug, "cats");
    }
}
