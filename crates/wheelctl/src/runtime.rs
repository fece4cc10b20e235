use crate::command::Command;
use async_channel::Sender;
use std::thread;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads commands from stdin on a background Tokio runtime. End of input is
/// reported as [`Command::Quit`].
pub fn start_stdin_reader(tx: Sender<Command>) {
    thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                tx.close();
                return;
            }
        };
        rt.block_on(read_commands(tx));
    });
}

async fn read_commands(tx: Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(command) => {
                        if tx.send(command).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }
            Ok(None) => {
                let _ = tx.send(Command::Quit).await;
                break;
            }
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                let _ = tx.send(Command::Quit).await;
                break;
            }
        }
    }
}
