use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufReader, Read, Write};
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::RankedResult;
use crate::protocol::{
    FilterArgs, FilterReply, RpcRequest, RpcResponse, SetListArgs, SetListReply, METHOD_FILTER,
    METHOD_SET_COMMAND_LIST, METHOD_SET_LIST,
};

#[derive(Debug)]
pub enum ChannelError {
    Connect(std::io::Error),
    Io(std::io::Error),
    Closed,
    Encode(serde_json::Error),
    Decode(serde_json::Error),
    Rpc { code: i64, message: String },
    Protocol(String),
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connect(error) => write!(f, "backend channel connect failed: {error}"),
            Self::Io(error) => write!(f, "backend channel io error: {error}"),
            Self::Closed => write!(f, "backend channel closed"),
            Self::Encode(error) => write!(f, "request encode failed: {error}"),
            Self::Decode(error) => write!(f, "response decode failed: {error}"),
            Self::Rpc { code, message } => write!(f, "backend rpc error {code}: {message}"),
            Self::Protocol(detail) => write!(f, "protocol violation: {detail}"),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Ranking as an opaque request/response capability. The production
/// implementation talks line-delimited JSON-RPC to an external process; tests
/// and in-process rankers substitute their own implementation.
pub trait SearchBackend: Send {
    fn set_launchable_list(&mut self, keys: &[String]) -> Result<i64, ChannelError>;
    fn set_command_list(&mut self, keys: &[String]) -> Result<i64, ChannelError>;
    fn filter(&mut self, pattern: &str) -> Result<Vec<RankedResult>, ChannelError>;
}

impl<T: SearchBackend + ?Sized> SearchBackend for Box<T> {
    fn set_launchable_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        (**self).set_launchable_list(keys)
    }

    fn set_command_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        (**self).set_command_list(keys)
    }

    fn filter(&mut self, pattern: &str) -> Result<Vec<RankedResult>, ChannelError> {
        (**self).filter(pattern)
    }
}

/// One duplex JSON-RPC channel. At most one request is in flight at a time;
/// every call writes one line and blocks for exactly one response line.
pub struct RpcChannel<R, W> {
    reader: BufReader<R>,
    writer: W,
    next_id: u64,
}

impl<R: Read, W: Write> RpcChannel<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            next_id: 1,
        }
    }

    pub fn into_parts(self) -> (R, W) {
        (self.reader.into_inner(), self.writer)
    }

    fn call<P: Serialize, T: DeserializeOwned>(
        &mut self,
        method: &'static str,
        params: P,
    ) -> Result<T, ChannelError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = RpcRequest::new(id, method, params);
        let mut line = serde_json::to_string(&request).map_err(ChannelError::Encode)?;
        line.push('\n');
        self.writer
            .write_all(line.as_bytes())
            .map_err(ChannelError::Io)?;
        self.writer.flush().map_err(ChannelError::Io)?;

        let mut raw = String::new();
        let read = self.reader.read_line(&mut raw).map_err(ChannelError::Io)?;
        if read == 0 {
            return Err(ChannelError::Closed);
        }

        let response: RpcResponse<T> =
            serde_json::from_str(raw.trim_end()).map_err(ChannelError::Decode)?;
        if let Some(error) = response.error {
            return Err(ChannelError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        if response.id != Some(id) {
            return Err(ChannelError::Protocol(format!(
                "response id {:?} does not match request id {id}",
                response.id
            )));
        }

        response
            .result
            .ok_or_else(|| ChannelError::Protocol("response carried neither result nor error".to_string()))
    }
}

impl<R: Read + Send, W: Write + Send> SearchBackend for RpcChannel<R, W> {
    fn set_launchable_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        let reply: SetListReply = self.call(
            METHOD_SET_LIST,
            SetListArgs {
                list: keys.to_vec(),
            },
        )?;
        Ok(reply.result)
    }

    fn set_command_list(&mut self, keys: &[String]) -> Result<i64, ChannelError> {
        let reply: SetListReply = self.call(
            METHOD_SET_COMMAND_LIST,
            SetListArgs {
                list: keys.to_vec(),
            },
        )?;
        Ok(reply.result)
    }

    fn filter(&mut self, pattern: &str) -> Result<Vec<RankedResult>, ChannelError> {
        let reply: FilterReply = self.call(
            METHOD_FILTER,
            FilterArgs {
                pattern: pattern.to_string(),
            },
        )?;
        Ok(reply.results.into_iter().map(RankedResult::from).collect())
    }
}

/// Filesystem location of the local ranker endpoint on non-Windows hosts.
#[cfg(not(windows))]
pub fn socket_path(channel_name: &str) -> PathBuf {
    let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir);
    runtime_dir.join(format!("{channel_name}.sock"))
}

#[cfg(windows)]
pub fn pipe_path(channel_name: &str) -> PathBuf {
    PathBuf::from(format!(r"\\.\pipe\{channel_name}"))
}

/// Connects to the well-known local endpoint the ranker listens on. A missing
/// or not-yet-listening endpoint surfaces as `ChannelError::Connect`; this
/// layer never retries.
#[cfg(windows)]
pub fn connect(channel_name: &str) -> Result<Box<dyn SearchBackend>, ChannelError> {
    let pipe = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(pipe_path(channel_name))
        .map_err(ChannelError::Connect)?;
    let reader = pipe.try_clone().map_err(ChannelError::Connect)?;
    Ok(Box::new(RpcChannel::new(reader, pipe)))
}

#[cfg(not(windows))]
pub fn connect(channel_name: &str) -> Result<Box<dyn SearchBackend>, ChannelError> {
    let stream = std::os::unix::net::UnixStream::connect(socket_path(channel_name))
        .map_err(ChannelError::Connect)?;
    let reader = stream.try_clone().map_err(ChannelError::Connect)?;
    Ok(Box::new(RpcChannel::new(reader, stream)))
}
