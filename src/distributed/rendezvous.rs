use std::{collections::BTreeMap, time::Duration};

use futures::future;
use log::{debug, info, warn};
use tokio::{
    net::{TcpListener, TcpStream},
    time::{self, Instant},
};

use super::{Bootstrap, Handshake, HandshakeChannel, ProcessInfo};
use crate::error::{Result, TrainErr};

const RETRY_DELAY: Duration = Duration::from_millis(100);
/// How long a fresh connection has to send its join before the coordinator moves on.
const JOIN_TIMEOUT: Duration = Duration::from_secs(2);
/// How long a previously joined connection gets to show it hung up.
const HANGUP_GRACE: Duration = Duration::from_millis(200);

/// Establishes the group over TCP: rank zero listens at the coordinator address and every other
/// rank connects to it.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    coordinator: String,
    rank: usize,
    world_size: usize,
    timeout: Duration,
}

impl Rendezvous {
    /// Creates a new `Rendezvous`.
    ///
    /// # Arguments
    /// * `coordinator` - The address rank zero listens at.
    /// * `rank` - This process's index within the group.
    /// * `world_size` - The amount of processes in the group.
    /// * `timeout` - How long to wait for the whole group to be established.
    ///
    /// # Returns
    /// The rendezvous, or an error if `rank` is not within `0..world_size`.
    pub fn new(
        coordinator: impl Into<String>,
        rank: usize,
        world_size: usize,
        timeout: Duration,
    ) -> Result<Self> {
        if rank >= world_size {
            return Err(TrainErr::InvalidConfig(format!(
                "rank ({rank}) must be lower than the world size ({world_size})"
            )));
        }

        Ok(Self {
            coordinator: coordinator.into(),
            rank,
            world_size,
            timeout,
        })
    }
}

impl Bootstrap for Rendezvous {
    async fn initialize(&mut self) -> Result<ProcessInfo> {
        let deadline = Instant::now() + self.timeout;

        if self.rank == 0 {
            let listener = TcpListener::bind(&self.coordinator).await?;
            info!("coordinating {} processes at {}", self.world_size, listener.local_addr()?);
            coordinate(listener, self.world_size, deadline).await
        } else {
            join(&self.coordinator, self.rank, self.world_size, deadline).await
        }
    }
}

/// Runs the coordinator side: accepts connections until every other rank has joined, then
/// releases them all at once.
///
/// Invalid joins are rejected and do not count towards the group. A connection that sends
/// nothing within a short window is dropped, and a rank whose previous connection hung up may
/// join again.
///
/// # Errors
/// Returns `TrainErr::RendezvousTimeout` if the group is not complete by `deadline`.
pub async fn coordinate(
    listener: TcpListener,
    world_size: usize,
    deadline: Instant,
) -> Result<ProcessInfo> {
    let mut joined: BTreeMap<usize, HandshakeChannel<TcpStream>> = BTreeMap::new();

    while joined.len() + 1 < world_size {
        let timed_out = || {
            warn!(
                "rendezvous timed out with {} of {world_size} processes",
                joined.len() + 1
            );
            TrainErr::RendezvousTimeout {
                rank: 0,
                world_size,
            }
        };

        let (stream, addr) = time::timeout_at(deadline, listener.accept())
            .await
            .map_err(|_| timed_out())??;

        let mut channel = HandshakeChannel::new(stream);
        let join_by = deadline.min(Instant::now() + JOIN_TIMEOUT);
        let msg = match time::timeout_at(join_by, channel.recv()).await {
            Ok(Ok(msg)) => msg,
            Ok(Err(e)) => {
                warn!("failed handshake with {addr}: {e}");
                continue;
            }
            Err(_) if join_by < deadline => {
                warn!("{addr} sent nothing within {JOIN_TIMEOUT:?}, dropping it");
                continue;
            }
            Err(_) => return Err(timed_out()),
        };

        let Handshake::Join {
            rank,
            world_size: theirs,
        } = msg
        else {
            warn!("expected join from {addr}, got {}", msg.kind());
            continue;
        };

        if let Some(previous) = joined.get(&rank) {
            if previous.is_closed(HANGUP_GRACE).await {
                info!("process {rank} reconnected, dropping its previous connection");
                joined.remove(&rank);
            }
        }

        if let Some(reason) = check_join(rank, theirs, world_size, |r| joined.contains_key(&r)) {
            warn!("rejecting {addr}: {reason}");
            if let Err(e) = channel.send(&Handshake::Reject { reason }).await {
                debug!("failed to notify {addr} of its rejection: {e}");
            }
            continue;
        }

        info!(rank = rank; "process {rank} joined from {addr}");
        joined.insert(rank, channel);
    }

    let ready = Handshake::Ready { world_size };
    future::try_join_all(joined.values_mut().map(|channel| channel.send(&ready))).await?;

    info!("all {world_size} processes joined");
    Ok(ProcessInfo::new(0, world_size))
}

/// Runs the joining side: connects to the coordinator, retrying until it is reachable, and waits
/// to be released.
///
/// # Errors
/// Returns `TrainErr::Rejected` if the coordinator refuses this rank, and
/// `TrainErr::RendezvousTimeout` if the group is not complete by `deadline`.
pub async fn join(
    coordinator: &str,
    rank: usize,
    world_size: usize,
    deadline: Instant,
) -> Result<ProcessInfo> {
    let timed_out = || TrainErr::RendezvousTimeout { rank, world_size };

    let stream = loop {
        match time::timeout_at(deadline, TcpStream::connect(coordinator)).await {
            Ok(Ok(stream)) => break stream,
            Ok(Err(e)) if Instant::now() + RETRY_DELAY < deadline => {
                debug!("coordinator at {coordinator} not reachable yet: {e}");
                time::sleep(RETRY_DELAY).await;
            }
            _ => return Err(timed_out()),
        }
    };

    let mut channel = HandshakeChannel::new(stream);
    channel.send(&Handshake::Join { rank, world_size }).await?;
    debug!(rank = rank, world_size = world_size; "join sent, waiting for the group");

    match time::timeout_at(deadline, channel.recv()).await {
        Ok(Ok(Handshake::Ready { world_size })) => {
            info!("process {rank} released into a group of {world_size}");
            Ok(ProcessInfo::new(rank, world_size))
        }
        Ok(Ok(Handshake::Reject { reason })) => Err(TrainErr::Rejected { rank, reason }),
        Ok(Ok(other)) => Err(TrainErr::UnexpectedMessage {
            rank,
            got: other.kind(),
        }),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(timed_out()),
    }
}

fn check_join(
    rank: usize,
    theirs: usize,
    world_size: usize,
    already_joined: impl Fn(usize) -> bool,
) -> Option<String> {
    if theirs != world_size {
        return Some(format!(
            "world size mismatch: coordinator expects {world_size}, got {theirs}"
        ));
    }

    if rank == 0 || rank >= world_size {
        return Some(format!("rank {rank} is out of range 1..{world_size}"));
    }

    if already_joined(rank) {
        return Some(format!("rank {rank} already joined"));
    }

    None
}
