//! Chat command: connects to a server and runs an interactive session.

use linecast_core::Endpoint;
use linecast_protocol::FrameLayout;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::session::ChatSession;

/// Shown when no name was given on the command line or in the config.
pub const NAME_PROMPT: &str = "Enter your name: ";

/// Runs a chat session against `endpoint` using the process console.
pub async fn run(endpoint: Endpoint, name: Option<String>) -> ClientResult<()> {
    let mut input = BufReader::new(tokio::io::stdin());

    let name = match name {
        Some(name) => name,
        None => prompt_name(&mut input, &mut tokio::io::stdout()).await?,
    };

    let stream = TcpStream::connect(endpoint.to_string())
        .await
        .map_err(|e| ClientError::Connection(format!("failed to connect to {}: {}", endpoint, e)))?;
    info!(server = %endpoint, name = %name, "Connected");

    let (reader, writer) = stream.into_split();
    let summary = ChatSession::new(name, FrameLayout::default())
        .run(reader, writer, input, tokio::io::stdout())
        .await?;

    debug!(sent = summary.sent, received = summary.received, "Session ended");
    Ok(())
}

/// Asks for a display name until a non-blank one is entered.
pub async fn prompt_name<I, O>(input: &mut I, output: &mut O) -> ClientResult<String>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    loop {
        output.write_all(NAME_PROMPT.as_bytes()).await?;
        output.flush().await?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Err(ClientError::Config(
                "no name given before end of input".to_string(),
            ));
        }

        let name = line.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prompt_returns_trimmed_name() {
        let mut input = &b"  alice \n"[..];
        let mut output = Vec::new();

        let name = prompt_name(&mut input, &mut output).await.unwrap();
        assert_eq!(name, "alice");
        assert_eq!(output, NAME_PROMPT.as_bytes());
    }

    #[tokio::test]
    async fn prompt_repeats_on_blank_line() {
        let mut input = &b"\n   \nbob\n"[..];
        let mut output = Vec::new();

        let name = prompt_name(&mut input, &mut output).await.unwrap();
        assert_eq!(name, "bob");
        assert_eq!(output, NAME_PROMPT.repeat(3).as_bytes());
    }

    #[tokio::test]
    async fn prompt_fails_on_eof() {
        let mut input = &b""[..];
        let mut output = Vec::new();

        let err = prompt_name(&mut input, &mut output).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[tokio::test]
    async fn connect_failure_is_a_connection_error() {
        // Grab a free port, then close it so nothing listens there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = run(Endpoint::new("127.0.0.1", port), Some("alice".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)), "{err}");
    }
}
