use axum::extract::{Multipart, multipart::Field};
use utoipa::ToSchema;

use crate::api::models::ApiError;
use crate::core::{
    errors::{CarebookError, FieldError},
    models::doctor::NewDoctor,
    services::ProfileChanges,
};
use crate::infrastructure::images::ImageUpload;

/// Multipart body of `add-doctor`.
#[derive(Debug, Default, ToSchema)]
pub struct AddDoctorForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub speciality: String,
    pub degree: String,
    pub experience: String,
    pub about: String,
    pub fees: Option<f64>,
    /// Plain text or a JSON object with `line1`/`line2`.
    pub address: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<ImageUpload>,
}

impl AddDoctorForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = AddDoctorForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = read_image(field).await?,
                "name" => form.name = field.text().await?,
                "email" => form.email = field.text().await?,
                "password" => form.password = field.text().await?,
                "speciality" => form.speciality = field.text().await?,
                "degree" => form.degree = field.text().await?,
                "experience" => form.experience = field.text().await?,
                "about" => form.about = field.text().await?,
                "fees" => form.fees = parse_fees(&field.text().await?)?,
                "address" => form.address = field.text().await?,
                other => return Err(unknown_field(other)),
            }
        }
        Ok(form)
    }

    pub fn into_parts(self) -> (NewDoctor, Option<ImageUpload>) {
        let doctor = NewDoctor {
            name: self.name,
            email: self.email,
            password: self.password,
            speciality: self.speciality,
            degree: self.degree,
            experience: self.experience,
            about: self.about,
            fees: self.fees,
            address: self.address,
        };
        (doctor, self.image)
    }
}

/// Multipart body of `update-profile`. Omitted parts leave the stored value alone.
#[derive(Debug, Default, ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UpdateProfileForm {
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<ImageUpload>,
}

impl UpdateProfileForm {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = UpdateProfileForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => form.image = read_image(field).await?,
                "userId" => form.user_id = Some(field.text().await?),
                "name" => form.name = Some(field.text().await?),
                "phone" => form.phone = Some(field.text().await?),
                "address" => form.address = Some(field.text().await?),
                "dob" => form.dob = Some(field.text().await?),
                "gender" => form.gender = Some(field.text().await?),
                other => return Err(unknown_field(other)),
            }
        }
        Ok(form)
    }

    pub fn into_changes(self) -> ProfileChanges {
        ProfileChanges {
            name: self.name,
            phone: self.phone,
            address: self.address,
            dob: self.dob,
            gender: self.gender,
            image: self.image,
        }
    }
}

/// Reads a file part. An empty part (no file chosen in a browser form) counts as absent.
async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>, ApiError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();
    let bytes = field.bytes().await?;
    if bytes.is_empty() {
        return Ok(None);
    }
    if !content_type.starts_with("image/") {
        return Err(ApiError(CarebookError::InvalidInput(
            "image".to_string(),
            FieldError::new("image", "Invalid Image", format!("Unsupported image type {}", content_type)),
        )));
    }
    Ok(Some(ImageUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

fn parse_fees(raw: &str) -> Result<Option<f64>, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        ApiError(CarebookError::InvalidInput(
            "fees".to_string(),
            FieldError::new("fees", "Invalid Amount", "fees must be a number"),
        ))
    })
}

fn unknown_field(name: &str) -> ApiError {
    ApiError(CarebookError::MalformedRequest(format!("Unknown form field '{}'", name)))
}
