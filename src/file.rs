use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};

use crate::cli::FileArgs;
use crate::client::{TranscriptionClient, TranscriptionOptions, TranscriptionResult, UploadRequest};
use crate::validate::{FALLBACK_CONTENT_TYPE, content_type_for_path, validate};

/// Reads, validates and transcribes one local file.
pub async fn transcribe_path(
    client: &TranscriptionClient,
    audio_path: &Path,
    options: TranscriptionOptions,
) -> Result<TranscriptionResult> {
    let metadata = tokio::fs::metadata(audio_path)
        .await
        .map_err(|_| anyhow!("Audio file not found: {}", audio_path.display()))?;
    if !metadata.is_file() {
        return Err(anyhow!("Expected a file at: {}", audio_path.display()));
    }

    let content_type = content_type_for_path(audio_path).unwrap_or(FALLBACK_CONTENT_TYPE);
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    validate(content_type, size)?;

    let bytes = tokio::fs::read(audio_path)
        .await
        .with_context(|| format!("Failed to read audio file: {}", audio_path.display()))?;

    let filename = audio_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "audio_upload.mp3".to_string());

    debug!(
        "Loaded audio file: {} ({} bytes, {content_type})",
        audio_path.display(),
        bytes.len()
    );

    let result = client
        .transcribe(UploadRequest {
            bytes,
            filename,
            content_type: content_type.to_string(),
            options,
        })
        .await?;

    Ok(result)
}

/// Prints the transcript, or writes it to `save_to` when given.
pub async fn write_transcript(result: &TranscriptionResult, save_to: Option<&Path>) -> Result<()> {
    let text = result
        .text()
        .ok_or_else(|| anyhow!("response missing `text` field."))?;

    match save_to {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            tokio::fs::write(path, text)
                .await
                .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
            info!("Transcript saved to {}", path.display());
        }
        None => println!("{text}"),
    }

    Ok(())
}

pub async fn run_file(args: FileArgs, client: &TranscriptionClient) -> Result<()> {
    let options = TranscriptionOptions {
        model: args.model,
        response_format: args.response_format,
        prompt: args.prompt,
    };

    info!(
        "Transcribing {} with model={}",
        args.audio_path.display(),
        options.model
    );

    let result = transcribe_path(client, &args.audio_path, options).await?;
    write_transcript(&result, args.save_to.as_deref()).await
}
