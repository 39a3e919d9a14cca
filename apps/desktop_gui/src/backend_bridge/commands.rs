//! Backend commands queued from UI to backend worker.

use shared::domain::NarrationRequest;

#[derive(Debug)]
pub enum BackendCommand {
    GenerateAudio {
        generation: u64,
        request: NarrationRequest,
    },
    DownloadAudio {
        audio_url: String,
        filename: String,
    },
    PlayAudio {
        audio_url: String,
    },
    StopAudio,
}
