use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use futures_util::{SinkExt, StreamExt};
use ldfs_viewer::config::ViewerConfig;
use ldfs_viewer::dispatcher::Dispatcher;
use ldfs_viewer::logger::{Logger, NoopLogger};
use ldfs_viewer::net::{open_channel, ChannelEvent, WsSink};
use ldfs_viewer::origin::Origin;
use ldfs_viewer::pane::{PaneId, PaneState};
use ldfs_viewer::workspace::Workspace;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

fn init_frame(path: &[&str], dirs: &[&str]) -> String {
    let items: Vec<Value> = dirs
        .iter()
        .map(|d| json!({"name": d, "type": "Directory", "sha1": format!("d-{d}"), "size": 0}))
        .collect();
    json!({"cmd": "init", "dir_path": path, "home_path": ["/"], "total": dirs.len(), "items": items})
        .to_string()
}

// Drain channel events into the workspace until `done` holds.
async fn pump<F>(
    ws: &mut Workspace<WsSink>,
    rx: &Receiver<ChannelEvent>,
    mut done: F,
) -> Result<()>
where
    F: FnMut(&Workspace<WsSink>) -> bool,
{
    for _ in 0..500u32 {
        while let Ok(ev) = rx.try_recv() {
            match ev {
                ChannelEvent::Opened { pane } => ws.on_open(pane),
                ChannelEvent::Frame { pane, text } => ws.handle_inbound(pane, &text),
                ChannelEvent::Closed { pane, .. } => ws.on_closed(pane),
            }
        }
        if done(ws) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    bail!("timed out waiting for channel events")
}

fn connect(port: u16) -> Result<(Workspace<WsSink>, Receiver<ChannelEvent>)> {
    let origin = Origin::parse(&format!("127.0.0.1:{}", port))?;
    let (tx, rx) = std::sync::mpsc::channel();
    let logger: Arc<dyn Logger> = Arc::new(NoopLogger);
    let mut dispatchers = [PaneId::Local, PaneId::Remote].map(|pane| {
        let sink = open_channel(pane, origin.channel_url(pane), tx.clone(), logger.clone());
        Some(Dispatcher::new(pane, sink, logger.clone()))
    });
    let local = dispatchers[0].take().unwrap();
    let remote = dispatchers[1].take().unwrap();
    let mut ws = Workspace::new(local, remote, &ViewerConfig::default());
    ws.begin_connect()?;
    Ok((ws, rx))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn browse_and_mkdir_over_real_channels() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    // Each channel gets an init on connect; the remote one then expects a mkdir.
    let server = tokio::spawn(async move {
        let mut received = Vec::new();
        for _ in 0..2 {
            let (stream, _) = listener.accept().await?;
            let mut ws = tokio_tungstenite::accept_async(stream).await?;
            ws.send(Message::Text(init_frame(&["/", "data"], &["a", "b"]))).await?;
            received.push(ws);
        }
        let mut commands = Vec::new();
        for ws in received.iter_mut() {
            if let Ok(Some(Ok(Message::Text(text)))) =
                tokio::time::timeout(Duration::from_secs(2), ws.next()).await
            {
                commands.push(serde_json::from_str::<Value>(&text)?);
                ws.send(Message::Text(init_frame(&["/", "data"], &["a", "b", "new"]))).await?;
            }
        }
        // sockets stay open until the client side has been checked
        anyhow::Ok((commands, received))
    });

    let (mut ws, rx) = connect(port)?;
    pump(&mut ws, &rx, |ws| {
        ws.pane(PaneId::Local).state() == PaneState::Browsing
            && ws.pane(PaneId::Remote).state() == PaneState::Browsing
    })
    .await?;
    assert_eq!(ws.pane(PaneId::Remote).path().join(), "/data");
    assert_eq!(ws.pane(PaneId::Remote).listing().dirs().len(), 2);

    ws.pane_mut(PaneId::Remote).mkdir("new")?;
    assert!(matches!(ws.pane(PaneId::Remote).state(), PaneState::AwaitingServerAck(_)));
    pump(&mut ws, &rx, |ws| ws.pane(PaneId::Remote).listing().dirs().len() == 3).await?;
    assert_eq!(ws.pane(PaneId::Remote).state(), PaneState::Browsing);

    let (commands, _sockets) = server.await??;
    assert_eq!(
        commands,
        vec![json!({"cmd": "mkdir", "name": "new", "dir_path": ["/", "data"]})]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_close_marks_pane_lost() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let server = tokio::spawn(async move {
        for _ in 0..2 {
            let (stream, _) = listener.accept().await?;
            let mut ws = tokio_tungstenite::accept_async(stream).await?;
            ws.send(Message::Text(init_frame(&["/"], &[]))).await?;
            ws.close(None).await?;
        }
        anyhow::Ok(())
    });

    let (mut ws, rx) = connect(port)?;
    pump(&mut ws, &rx, |ws| {
        ws.pane(PaneId::Local).is_connection_lost() && ws.pane(PaneId::Remote).is_connection_lost()
    })
    .await?;
    server.await??;

    assert!(ws.pane_mut(PaneId::Local).refresh().is_err());
    assert!(ws
        .log()
        .lines()
        .any(|l| l.contains("Lost connection to remote storage")));
    Ok(())
}
