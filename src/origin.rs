//! Viewer origin: one server address, two channel URLs

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

use crate::pane::PaneId;

pub const DEFAULT_PORT: u16 = 8080;

/// Normalized `ws://` or `wss://` base of the viewer server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    base: Url,
}

impl Origin {
    /// Accepts `host[:port]`, `http(s)://host[:port]` or `ws(s)://host[:port]`.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        if s.is_empty() {
            bail!("empty origin");
        }
        let with_scheme = if s.contains("://") {
            s.to_string()
        } else {
            format!("ws://{}", s)
        };
        let mut base = Url::parse(&with_scheme).with_context(|| format!("invalid origin {:?}", input))?;
        let scheme = match base.scheme() {
            "ws" | "http" => "ws",
            "wss" | "https" => "wss",
            other => bail!("unsupported scheme {:?} in origin", other),
        };
        base.set_scheme(scheme)
            .map_err(|_| anyhow!("cannot use scheme {} for {}", scheme, input))?;
        if base.host_str().map_or(true, str::is_empty) {
            bail!("origin {:?} has no host", input);
        }
        if base.port().is_none() && !input.contains("://") {
            base.set_port(Some(DEFAULT_PORT))
                .map_err(|_| anyhow!("cannot set port on {}", input))?;
        }
        base.set_path("");
        base.set_query(None);
        base.set_fragment(None);
        Ok(Self { base })
    }

    pub fn channel_url(&self, pane: PaneId) -> Url {
        let mut url = self.base.clone();
        url.set_path(pane.channel_path());
        url
    }

    pub fn host(&self) -> &str {
        self.base.host_str().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_gets_default_port() {
        let o = Origin::parse("storage.lan").unwrap();
        assert_eq!(o.channel_url(PaneId::Local).as_str(), "ws://storage.lan:8080/websocket/local");
        assert_eq!(o.host(), "storage.lan");
    }

    #[test]
    fn http_maps_to_ws() {
        let o = Origin::parse("https://viewer.example.com/index.html?x=1").unwrap();
        assert_eq!(
            o.channel_url(PaneId::Remote).as_str(),
            "wss://viewer.example.com/websocket/remote"
        );
        let o = Origin::parse("http://127.0.0.1:9000").unwrap();
        assert_eq!(o.channel_url(PaneId::Local).as_str(), "ws://127.0.0.1:9000/websocket/local");
    }

    #[test]
    fn rejects_bad_origins() {
        assert!(Origin::parse("").is_err());
        assert!(Origin::parse("ftp://host").is_err());
    }
}
