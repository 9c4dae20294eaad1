use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use parking_lot::Mutex;
use tracing::{info, warn};

use coze_ws::core::audio::speech::{
    SpeechAudioCompletedEvent, SpeechAudioUpdateEvent, SpeechUpdateData,
    WebsocketAudioSpeechClient,
};
use coze_ws::core::chat::{
    ConversationChatCompletedEvent, ConversationChatFailedEvent, ConversationMessageCreateEvent,
    ConversationMessageDeltaEvent, WebsocketChatClient,
};
use coze_ws::core::models::{ErrorEvent, OutputAudio};
use coze_ws::{
    BaseCallbackHandler, ChatCallbackHandler, ChatCreateRequest, ChatProtocol, ClientConfig,
    CozeWebsockets, SpeechCallbackHandler, SpeechProtocol, WebsocketError,
};

/// Coze realtime client - speech synthesis and bot chat over WebSocket
#[derive(Parser, Debug)]
#[command(name = "coze-ws")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize text and write the audio to a WAV file
    Speech {
        /// Text to synthesize
        #[arg(short = 't', long = "text")]
        text: String,

        /// Voice to use (server default if omitted)
        #[arg(long = "voice-id")]
        voice_id: Option<String>,

        /// Output sample rate in Hz
        #[arg(long = "sample-rate", default_value_t = 24000)]
        sample_rate: u32,

        /// Output WAV file path
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },

    /// Send one text message to a bot and print the answer
    Chat {
        #[arg(long = "bot-id")]
        bot_id: String,

        #[arg(long = "workflow-id")]
        workflow_id: Option<String>,

        /// Message text
        #[arg(short = 't', long = "text")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (must be done before config loading)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Must be installed before the first wss:// handshake
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("Failed to install default crypto provider"))?;

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ClientConfig::from_file(&path)
        }
        None => ClientConfig::from_env(),
    }
    .map_err(|e| anyhow!("Failed to load configuration: {e}"))?;

    let coze = CozeWebsockets::new(config)?;

    match cli.command {
        Commands::Speech {
            text,
            voice_id,
            sample_rate,
            output,
        } => run_speech(&coze, text, voice_id, sample_rate, output).await,
        Commands::Chat {
            bot_id,
            workflow_id,
            text,
        } => {
            let mut request = ChatCreateRequest::new(bot_id);
            request.workflow_id = workflow_id;
            run_chat(&coze, request, text).await
        }
    }
}

// =============================================================================
// Speech
// =============================================================================

#[derive(Default)]
struct SpeechCollector {
    pcm: Mutex<Vec<u8>>,
    error: Mutex<Option<String>>,
}

impl SpeechCollector {
    fn record_error(&self, message: String) {
        self.error.lock().get_or_insert(message);
    }
}

#[async_trait]
impl BaseCallbackHandler<SpeechProtocol> for SpeechCollector {
    async fn on_failure(&self, _client: &WebsocketAudioSpeechClient, error: WebsocketError) {
        self.record_error(error.to_string());
    }
}

#[async_trait]
impl SpeechCallbackHandler for SpeechCollector {
    async fn on_speech_audio_update(
        &self,
        _client: &WebsocketAudioSpeechClient,
        event: SpeechAudioUpdateEvent,
    ) {
        match event.decoded_delta() {
            Ok(chunk) => self.pcm.lock().extend_from_slice(&chunk),
            Err(e) => warn!(error = %e, "Skipping undecodable audio chunk"),
        }
    }

    async fn on_speech_audio_completed(
        &self,
        client: &WebsocketAudioSpeechClient,
        _event: SpeechAudioCompletedEvent,
    ) {
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close session");
        }
    }

    async fn on_error(&self, client: &WebsocketAudioSpeechClient, event: ErrorEvent) {
        self.record_error(format!("server error {}: {}", event.data.code, event.data.msg));
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close session");
        }
    }
}

async fn run_speech(
    coze: &CozeWebsockets,
    text: String,
    voice_id: Option<String>,
    sample_rate: u32,
    output: PathBuf,
) -> anyhow::Result<()> {
    let collector = Arc::new(SpeechCollector::default());
    let client = coze.speech(collector.clone()).await?;

    client
        .speech_update(SpeechUpdateData {
            output_audio: Some(OutputAudio::pcm(sample_rate, voice_id)),
        })
        .await?;
    client.input_text_buffer_append(text).await?;
    client.input_text_buffer_complete().await?;
    client.join().await;

    if let Some(error) = collector.error.lock().take() {
        anyhow::bail!("Speech session failed: {error}");
    }

    let pcm = std::mem::take(&mut *collector.pcm.lock());
    write_wav(&output, &pcm, sample_rate)?;
    info!(
        bytes = pcm.len(),
        path = %output.display(),
        "Speech written"
    );
    println!("Wrote {} bytes of audio to {}", pcm.len(), output.display());
    Ok(())
}

/// Write little-endian 16-bit mono PCM as a WAV file.
fn write_wav(path: &PathBuf, pcm: &[u8], sample_rate: u32) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for sample in pcm.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
    }
    writer.finalize()?;
    Ok(())
}

// =============================================================================
// Chat
// =============================================================================

#[derive(Default)]
struct ChatPrinter {
    error: Mutex<Option<String>>,
}

#[async_trait]
impl BaseCallbackHandler<ChatProtocol> for ChatPrinter {
    async fn on_failure(&self, _client: &WebsocketChatClient, error: WebsocketError) {
        self.error.lock().get_or_insert(error.to_string());
    }
}

#[async_trait]
impl ChatCallbackHandler for ChatPrinter {
    async fn on_conversation_message_delta(
        &self,
        _client: &WebsocketChatClient,
        event: ConversationMessageDeltaEvent,
    ) {
        print!("{}", event.data.content);
        if let Err(e) = std::io::stdout().flush() {
            warn!(error = %e, "Failed to flush stdout");
        }
    }

    async fn on_conversation_chat_completed(
        &self,
        client: &WebsocketChatClient,
        event: ConversationChatCompletedEvent,
    ) {
        println!();
        if let Some(usage) = event.data.usage {
            info!(tokens = usage.token_count, "Chat completed");
        }
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close session");
        }
    }

    async fn on_conversation_chat_failed(
        &self,
        client: &WebsocketChatClient,
        event: ConversationChatFailedEvent,
    ) {
        let reason = event
            .data
            .last_error
            .map(|e| format!("{}: {}", e.code, e.msg))
            .unwrap_or_else(|| "unknown error".to_string());
        self.error.lock().get_or_insert(format!("chat failed: {reason}"));
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close session");
        }
    }

    async fn on_error(&self, client: &WebsocketChatClient, event: ErrorEvent) {
        self.error
            .lock()
            .get_or_insert(format!("server error {}: {}", event.data.code, event.data.msg));
        if let Err(e) = client.close().await {
            warn!(error = %e, "Failed to close session");
        }
    }
}

async fn run_chat(
    coze: &CozeWebsockets,
    request: ChatCreateRequest,
    text: String,
) -> anyhow::Result<()> {
    let printer = Arc::new(ChatPrinter::default());
    let client = coze.chat(request, printer.clone()).await?;

    client
        .conversation_message_create(ConversationMessageCreateEvent::user_text(text))
        .await?;
    client.join().await;

    if let Some(error) = printer.error.lock().take() {
        anyhow::bail!("{error}");
    }
    Ok(())
}
