use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::client::ResponseFormat;
use crate::config::DEFAULT_MODEL;

#[derive(Parser)]
#[command(
    name = "transcribe-relay",
    about = "Transcribe audio with OpenAI's speech-to-text models",
    long_about = "Forwards audio files to OpenAI's transcription API, either from the command line or through a small HTTP server. Requires OPENAI_API_KEY in the environment or a .env file.",
    after_help = "EXAMPLES:\n    # Start the HTTP server\n    transcribe-relay serve\n\n    # Transcribe a local file and print the text\n    transcribe-relay file meeting.mp3\n\n    # Ask for subtitles and save them\n    transcribe-relay file meeting.mp3 --model whisper-1 --response-format srt --save-to out/meeting.srt\n\n    # Guide the model with a prompt\n    transcribe-relay file call.wav --prompt \"Speakers: Ada, Grace\""
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(name = "serve", about = "Run the HTTP server exposing POST /transcribe")]
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[arg(long, default_value = "8000")]
        port: u16,
    },
    #[command(name = "file", about = "Transcribe a local audio file")]
    TranscribeFile(FileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FileArgs {
    /// Path to the audio file (mp3, mp4, mpeg, mpga, m4a, wav, webm)
    pub audio_path: PathBuf,

    /// Transcription model, e.g. gpt-4o-transcribe, gpt-4o-mini-transcribe, whisper-1
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Response format override (support varies by model)
    #[arg(long, value_enum)]
    pub response_format: Option<ResponseFormat>,

    /// Prompt to guide the transcription (not supported by diarization)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Save the transcript to this path instead of printing it
    #[arg(long)]
    pub save_to: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_defaults() {
        let cli = Cli::try_parse_from(["transcribe-relay", "file", "clip.mp3"]).unwrap();
        let Commands::TranscribeFile(args) = cli.command else {
            panic!("expected file command");
        };
        assert_eq!(args.audio_path, PathBuf::from("clip.mp3"));
        assert_eq!(args.model, DEFAULT_MODEL);
        assert_eq!(args.response_format, None);
        assert_eq!(args.prompt, None);
        assert_eq!(args.save_to, None);
    }

    #[test]
    fn file_flags() {
        let cli = Cli::try_parse_from([
            "transcribe-relay",
            "file",
            "clip.wav",
            "--model",
            "whisper-1",
            "--response-format",
            "verbose_json",
            "--prompt",
            "Speakers: Ada",
            "--save-to",
            "out/clip.json",
        ])
        .unwrap();
        let Commands::TranscribeFile(args) = cli.command else {
            panic!("expected file command");
        };
        assert_eq!(args.model, "whisper-1");
        assert_eq!(args.response_format, Some(ResponseFormat::VerboseJson));
        assert_eq!(args.prompt.as_deref(), Some("Speakers: Ada"));
        assert_eq!(args.save_to, Some(PathBuf::from("out/clip.json")));
    }

    #[test]
    fn rejects_unknown_response_format() {
        let result = Cli::try_parse_from([
            "transcribe-relay",
            "file",
            "clip.wav",
            "--response-format",
            "xml",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["transcribe-relay", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 8000);
            }
            Commands::TranscribeFile(_) => panic!("expected serve command"),
        }
    }
}
