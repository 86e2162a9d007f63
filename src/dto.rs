#[derive(serde::Serialize)]
pub struct TranscriptionDto {
    pub text: String,
}

#[derive(serde::Serialize)]
pub struct ErrorDto {
    pub error: String,
}

#[derive(serde::Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub message: &'static str,
}
