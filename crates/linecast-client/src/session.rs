//! Chat session: a send channel and a receive channel over one connection.
//!
//! The channels run as independent tasks and share a [`Liveness`] signal.
//! Whichever side fails first shuts the session down; the other side stops
//! at its next check or is woken out of its blocking wait.

use linecast_protocol::{FrameLayout, FrameReader, FrameWriter};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::ClientResult;
use crate::liveness::Liveness;

/// Printed once the server connection is lost.
pub const DISCONNECT_NOTICE: &str = "Disconnected from server";

/// Counters reported when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Console lines sent to the server.
    pub sent: usize,
    /// Frames received and printed.
    pub received: usize,
}

/// A chat session for one named participant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    name: String,
    layout: FrameLayout,
}

impl ChatSession {
    pub fn new(name: impl Into<String>, layout: FrameLayout) -> Self {
        Self {
            name: name.into(),
            layout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs both channels until the session shuts down.
    ///
    /// `reader` and `writer` are the two halves of the server connection,
    /// `input` is the console and `output` where received messages go.
    pub async fn run<R, W, I, O>(
        &self,
        reader: R,
        writer: W,
        input: I,
        output: O,
    ) -> ClientResult<SessionSummary>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
        I: AsyncBufRead + Unpin + Send + 'static,
        O: AsyncWrite + Unpin + Send + 'static,
    {
        let liveness = Liveness::new();

        let send = tokio::spawn(send_channel(
            input,
            FrameWriter::new(writer, self.layout),
            self.name.clone(),
            liveness.clone(),
        ));
        let receive = tokio::spawn(receive_channel(
            FrameReader::new(reader, self.layout),
            output,
            liveness,
        ));

        let (sent, received) = tokio::join!(send, receive);
        Ok(SessionSummary {
            sent: sent?,
            received: received?,
        })
    }
}

/// Formats a console line the way it is sent to the server.
pub fn format_message(name: &str, line: &str) -> String {
    format!("{}: {}", name, line)
}

/// Reads console lines and sends each as one or more frames.
///
/// Ends when the session is shut down, the console is closed, or a write
/// fails. The last two shut the session down. Returns the number of lines
/// sent.
pub async fn send_channel<I, W>(
    input: I,
    mut writer: FrameWriter<W>,
    name: String,
    liveness: Liveness,
) -> usize
where
    I: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut sent = 0;

    while liveness.is_alive() {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = liveness.cancelled() => break,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Console input closed");
                liveness.shut_down();
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read console input");
                liveness.shut_down();
                break;
            }
        };

        match writer.write_message(&format_message(&name, &line)).await {
            Ok(frames) => {
                sent += 1;
                debug!(frames, "Sent message");
            }
            Err(e) => {
                warn!(error = %e, "Failed to send message");
                liveness.shut_down();
                break;
            }
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!(error = %e, "Failed to shut down connection");
    }
    sent
}

/// Prints every frame received from the server, one per line.
///
/// On end of stream or a read error the session is shut down and
/// [`DISCONNECT_NOTICE`] is printed. Returns the number of frames printed.
pub async fn receive_channel<R, O>(mut reader: FrameReader<R>, mut output: O, liveness: Liveness) -> usize
where
    R: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut received = 0;

    while liveness.is_alive() {
        let frame = tokio::select! {
            frame = reader.read_frame() => frame,
            _ = liveness.cancelled() => break,
        };

        match frame {
            Ok(Some(text)) => {
                received += 1;
                if let Err(e) = print_line(&mut output, &text).await {
                    warn!(error = %e, "Failed to print message");
                    liveness.shut_down();
                    break;
                }
            }
            Ok(None) => {
                debug!("Server closed the connection");
                disconnected(&mut output, &liveness).await;
                break;
            }
            Err(e) => {
                warn!(error = %e, "Failed to receive message");
                disconnected(&mut output, &liveness).await;
                break;
            }
        }
    }

    received
}

async fn disconnected<O: AsyncWrite + Unpin>(output: &mut O, liveness: &Liveness) {
    liveness.shut_down();
    if let Err(e) = print_line(output, DISCONNECT_NOTICE).await {
        debug!(error = %e, "Failed to print disconnect notice");
    }
}

async fn print_line<O: AsyncWrite + Unpin>(output: &mut O, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}
