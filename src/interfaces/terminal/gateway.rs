use crate::domain::payment::{GatewayOutcome, PaymentRequest};
use crate::domain::ports::PaymentGateway;
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::warn;

/// Stand-in for the hosted payment popup when running in a terminal.
///
/// Prints the payment request, then reads one line: the reference the
/// gateway issued after paying, or an empty line / `close` to dismiss.
/// End of input, I/O errors, or a missing public key make the gateway
/// unavailable.
pub struct TerminalGateway<R, W> {
    public_key: Option<String>,
    io: Mutex<(R, W)>,
}

impl<R, W> TerminalGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(public_key: Option<String>, input: R, output: W) -> Self {
        Self {
            public_key,
            io: Mutex::new((input, output)),
        }
    }
}

fn prompt(public_key: &str, request: &PaymentRequest) -> String {
    format!(
        "\n== Payment ==\n\
         key:       {public_key}\n\
         reference: {}\n\
         email:     {}\n\
         amount:    {} {} ({} minor units)\n\
         Complete the payment, then enter the gateway reference (empty line to close): ",
        request.reference,
        request.email,
        request.order_total.rounded(),
        request.currency,
        request.amount_minor,
    )
}

#[async_trait]
impl<R, W> PaymentGateway for TerminalGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn initiate(&self, request: &PaymentRequest) -> GatewayOutcome {
        let Some(public_key) = self.public_key.as_deref() else {
            warn!("payment gateway not configured: missing public key");
            return GatewayOutcome::Unavailable;
        };

        let mut io = self.io.lock().await;
        let (input, output) = &mut *io;

        let shown = async {
            output
                .write_all(prompt(public_key, request).as_bytes())
                .await?;
            output.flush().await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        if let Err(e) = shown {
            warn!("payment prompt failed: {}", e);
            return GatewayOutcome::Unavailable;
        }

        let mut line = String::new();
        match input.read_line(&mut line).await {
            Ok(0) => GatewayOutcome::Unavailable,
            Ok(_) => match line.trim() {
                "" | "close" => GatewayOutcome::Closed,
                reference => GatewayOutcome::Completed {
                    reference: reference.to_string(),
                },
            },
            Err(e) => {
                warn!("reading payment reference failed: {}", e);
                GatewayOutcome::Unavailable
            }
        }
    }
}
