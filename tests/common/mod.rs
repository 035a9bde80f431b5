//! Recording [`NativeClient`] double shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use redbridge::core::command::Cmd;
use redbridge::native::NativeClient;
use redbridge::proto::frame::Frame;
use redbridge::{Error, RedisConnection, RedisNode, Result, SentinelConfig};

#[derive(Debug, Default)]
struct State {
    executed: Vec<Cmd>,
    queued: Vec<Cmd>,
    pipelined: Vec<Cmd>,
    quits: usize,
    syncs: usize,
    replies: HashMap<String, VecDeque<Result<Frame>>>,
    sync_failure: Option<Error>,
    unreachable: HashSet<RedisNode>,
    sentinels: Vec<(RedisNode, MockClient)>,
}

/// A native client that records every call and answers from a script.
///
/// Clones share state, so a test keeps one handle while the connection under
/// test owns another. Unscripted SCAN-family commands answer with an empty
/// final page; everything else answers `+OK`.
#[derive(Debug, Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<State>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Queues `frame` as the next reply to `name`.
    pub fn reply(&self, name: &str, frame: Frame) -> &Self {
        self.state()
            .replies
            .entry(name.to_string())
            .or_default()
            .push_back(Ok(frame));
        self
    }

    /// Queues a transport failure as the next reply to `name`.
    pub fn fail(&self, name: &str, message: &str) -> &Self {
        let err = Error::Io {
            source: io::Error::new(io::ErrorKind::BrokenPipe, message.to_string()),
        };
        self.state()
            .replies
            .entry(name.to_string())
            .or_default()
            .push_back(Err(err));
        self
    }

    /// Answers the next `name` by dropping the connection.
    pub fn reply_eof(&self, name: &str) -> &Self {
        let err = Error::Io {
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by server"),
        };
        self.state()
            .replies
            .entry(name.to_string())
            .or_default()
            .push_back(Err(err));
        self
    }

    /// Makes the next `sync` fail as a whole.
    pub fn fail_sync(&self, message: &str) {
        self.state().sync_failure = Some(Error::Io {
            source: io::Error::new(io::ErrorKind::ConnectionReset, message.to_string()),
        });
    }

    /// Makes `connect_sentinel` to `node` fail.
    pub fn mark_unreachable(&self, node: RedisNode) {
        self.state().unreachable.insert(node);
    }

    /// Commands executed directly, as strings.
    pub fn executed(&self) -> Vec<Vec<String>> {
        self.state().executed.iter().map(strings).collect()
    }

    /// Names of the commands executed directly.
    pub fn executed_names(&self) -> Vec<String> {
        self.state().executed.iter().map(Cmd::name).collect()
    }

    /// Commands sent through the pipeline, including already synced ones.
    pub fn pipelined(&self) -> Vec<Vec<String>> {
        let state = self.state();
        state
            .pipelined
            .iter()
            .chain(state.queued.iter())
            .map(strings)
            .collect()
    }

    pub fn quits(&self) -> usize {
        self.state().quits
    }

    pub fn syncs(&self) -> usize {
        self.state().syncs
    }

    /// Total number of native calls of any kind.
    pub fn calls(&self) -> usize {
        let state = self.state();
        state.executed.len()
            + state.queued.len()
            + state.pipelined.len()
            + state.quits
            + state.syncs
            + state.sentinels.len()
    }

    /// Sentinel clients opened so far, with the node each was opened for.
    pub fn sentinels(&self) -> Vec<(RedisNode, MockClient)> {
        self.state().sentinels.clone()
    }

    fn next_reply(state: &mut State, cmd: &Cmd) -> Result<Frame> {
        let name = cmd.name();
        if let Some(reply) = state.replies.get_mut(&name).and_then(VecDeque::pop_front) {
            return reply.and_then(Frame::into_result);
        }
        Ok(match name.as_str() {
            "SCAN" | "SSCAN" | "HSCAN" | "ZSCAN" => empty_page(),
            _ => Frame::ok(),
        })
    }
}

impl NativeClient for MockClient {
    fn execute(&mut self, cmd: Cmd) -> Result<Frame> {
        let mut state = self.state();
        let reply = Self::next_reply(&mut state, &cmd);
        state.executed.push(cmd);
        reply
    }

    fn queue(&mut self, cmd: Cmd) -> Result<()> {
        self.state().queued.push(cmd);
        Ok(())
    }

    fn sync(&mut self) -> Result<Vec<Result<Frame>>> {
        let mut state = self.state();
        state.syncs += 1;
        let queued = std::mem::take(&mut state.queued);
        if let Some(err) = state.sync_failure.take() {
            state.pipelined.extend(queued);
            return Err(err);
        }
        let replies = queued
            .iter()
            .map(|cmd| Self::next_reply(&mut state, cmd))
            .collect();
        state.pipelined.extend(queued);
        Ok(replies)
    }

    fn quit(&mut self) -> Result<()> {
        self.state().quits += 1;
        Ok(())
    }

    fn connect_sentinel(&self, node: &RedisNode) -> Result<Self> {
        let mut state = self.state();
        if state.unreachable.contains(node) {
            return Err(Error::Io {
                source: io::Error::new(io::ErrorKind::ConnectionRefused, node.to_string()),
            });
        }
        let client = MockClient::new();
        state.sentinels.push((node.clone(), client.clone()));
        Ok(client)
    }
}

/// A fresh connection plus a handle on its native client.
pub fn connection() -> (RedisConnection<MockClient>, MockClient) {
    let client = MockClient::new();
    (RedisConnection::new(client.clone()), client)
}

/// A connection already switched to pipelined mode.
pub fn pipelined_connection() -> (RedisConnection<MockClient>, MockClient) {
    let (mut conn, client) = connection();
    conn.open_pipeline().unwrap();
    (conn, client)
}

/// A connection that knows about the given sentinels.
pub fn sentinel_connection(nodes: Vec<RedisNode>) -> (RedisConnection<MockClient>, MockClient) {
    let client = MockClient::new();
    let conn = RedisConnection::new(client.clone())
        .with_sentinel(SentinelConfig::new("mymaster", nodes));
    (conn, client)
}

/// A SCAN-family reply page.
pub fn page(cursor: &str, items: &[&str]) -> Frame {
    Frame::Array(vec![
        Frame::bulk(cursor.to_string()),
        Frame::Array(items.iter().map(|i| Frame::bulk(i.to_string())).collect()),
    ])
}

pub fn empty_page() -> Frame {
    page("0", &[])
}

pub fn bulk(s: &str) -> Bytes {
    Bytes::from(s.to_string())
}

fn strings(cmd: &Cmd) -> Vec<String> {
    cmd.args()
        .iter()
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .collect()
}
