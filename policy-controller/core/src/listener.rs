use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt,
    net::{IpAddr, SocketAddr},
    str::FromStr,
};

/// Identifies a listener on a dataplane by the address and port it binds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerKey {
    pub address: IpAddr,
    pub port: u16,
}

/// Scopes a gateway listener to one of its virtual hosts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GatewayKey {
    pub listener: ListenerKey,
    pub hostname: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid listener address {0:?}: expected <ip>:<port>")]
pub struct ParseListenerKeyError(String);

// === impl ListenerKey ===

impl ListenerKey {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port }
    }
}

impl From<SocketAddr> for ListenerKey {
    fn from(addr: SocketAddr) -> Self {
        Self::new(addr.ip(), addr.port())
    }
}

impl From<ListenerKey> for SocketAddr {
    fn from(ListenerKey { address, port }: ListenerKey) -> Self {
        SocketAddr::new(address, port)
    }
}

impl fmt::Display for ListenerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SocketAddr::from(*self).fmt(f)
    }
}

impl FromStr for ListenerKey {
    type Err = ParseListenerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<SocketAddr>()
            .map(Into::into)
            .map_err(|_| ParseListenerKeyError(s.to_string()))
    }
}

// Listener keys are used as map keys in policy documents, so they are encoded as strings.
impl Serialize for ListenerKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ListenerKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;
        impl de::Visitor<'_> for Visitor {
            type Value = ListenerKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a listener address in <ip>:<port> format")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value.parse().map_err(de::Error::custom)
            }
        }
        deserializer.deserialize_str(Visitor)
    }
}

// === impl GatewayKey ===

impl GatewayKey {
    pub fn new(listener: ListenerKey, hostname: impl ToString) -> Self {
        Self {
            listener,
            hostname: hostname.to_string(),
        }
    }
}

impl fmt::Display for GatewayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.listener, self.hostname)
    }
}
