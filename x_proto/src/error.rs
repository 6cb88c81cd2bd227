//! Error kinds for READ_X, WRITE_X, and their shared configuration.

/// A bad configuration value caught at construction time, rather than
/// at first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `mtu` is outside [crate::mtu::MIN_MTU]..=[crate::mtu::MAX_MTU].
    MtuOutOfRange,
    /// `send_redundancy` was zero.
    ZeroRedundancy,
}

/// Errors from the READ_X (server sender) state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadXError<S, R> {
    /// The caller passed an empty `data` slice.
    EmptyData,
    /// `data` needs more than 4095 chunks at this MTU.
    TooManyChunks,
    /// No START magic (or anything) arrived before `start_timeout_ms`,
    /// or no response arrived before `ack_timeout_ms`.
    Timeout,
    /// The frame received in `WaitStart` was not the START magic.
    InvalidStartMagic,
    /// The frame received in `WaitResp` was neither an ACK nor a
    /// parseable, non-empty loss list.
    InvalidResponse,
    /// The transport failed to accept a send.
    Send(S),
    /// The transport failed permanently while receiving.
    Recv(R),
}

/// Errors from the WRITE_X (server receiver) state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteXError<S, R> {
    /// More than `max_retries` consecutive timeouts elapsed.
    Timeout,
    /// A received frame was too short to contain a header, or the
    /// header failed [crate::chunk::Header::validate].
    InvalidPacket,
    /// The header's `total`/`seq` fields were individually well-formed
    /// but the frame could not be interpreted as a chunk.
    InvalidHeader,
    /// A chunk payload was larger than `mtu - 3`.
    ChunkTooLarge,
    /// A later chunk's `total` disagreed with the first chunk's.
    TotalMismatch,
    /// `recv_buf` is smaller than `total * data_chunk_size`.
    BufferTooSmall,
    /// The transport failed to accept a send.
    Send(S),
    /// The transport failed permanently while receiving.
    Recv(R),
}
