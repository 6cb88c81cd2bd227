//! READ_X: the server-sender half of the X-Protocol. Pushes `data` to
//! a client, retransmitting whatever the client reports missing.

use crate::chunk::{decode_loss_list, is_ack, Bitmask, Header};
use crate::config::ReadXConfig;
use crate::error::ReadXError;
use crate::mtu::{chunks_needed, data_chunk_size, MAX_MTU};
use crate::transport::Transport;

/// Largest number of loss-list entries that fit in one MTU-sized frame.
const MAX_LOSS_ENTRIES: usize = MAX_MTU as usize / 2;

/// Run the READ_X state machine to completion: wait for the client's
/// START kick-off, then push `data` in chunked rounds until the client
/// ACKs or a terminal error occurs.
///
/// `data` must be non-empty and fit in at most 4095 chunks at
/// `config.mtu`.
pub fn run<T>(transport: &mut T, data: &[u8], config: ReadXConfig) -> Result<(), ReadXError<T::SendError, T::RecvError>>
where
    T: Transport,
{
    if data.is_empty() {
        return Err(ReadXError::EmptyData);
    }
    let total = chunks_needed(data.len(), config.mtu);
    if total > crate::chunk::MAX_CHUNKS as usize {
        return Err(ReadXError::TooManyChunks);
    }
    let total = total as u16;
    let dcs = data_chunk_size(config.mtu) as usize;

    #[cfg(feature = "defmt")]
    defmt::trace!("read_x: waiting for START, total={}", total);

    // WaitStart
    let mut recv_buf = [0u8; MAX_MTU as usize];
    match transport
        .recv(&mut recv_buf, config.start_timeout_ms)
        .map_err(ReadXError::Recv)?
    {
        Some(n) if crate::chunk::is_start_magic(&recv_buf[..n]) => {}
        Some(_) => return Err(ReadXError::InvalidStartMagic),
        None => return Err(ReadXError::Timeout),
    }

    // all chunks start pending
    let mut pending = Bitmask::init_all_set(total);
    let mut frame = [0u8; MAX_MTU as usize];
    let mut loss_scratch = [0u16; MAX_LOSS_ENTRIES];

    loop {
        // SendRound: ascending seq, redundant copies back-to-back
        for seq in 1..=total {
            if !pending.is_set(seq) {
                continue;
            }
            let start = (seq - 1) as usize * dcs;
            let end = (start + dcs).min(data.len());
            let payload_len = end - start;
            frame[..3].copy_from_slice(&Header { total, seq }.encode());
            frame[3..3 + payload_len].copy_from_slice(&data[start..end]);
            for _ in 0..config.send_redundancy {
                transport
                    .send(&frame[..3 + payload_len])
                    .map_err(ReadXError::Send)?;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("read_x: round sent, waiting for response");

        // WaitResp
        match transport
            .recv(&mut recv_buf, config.ack_timeout_ms)
            .map_err(ReadXError::Recv)?
        {
            None => return Err(ReadXError::Timeout),
            Some(n) if is_ack(&recv_buf[..n]) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("read_x: ACK received, done");
                return Ok(());
            }
            Some(n) => {
                let count = decode_loss_list(&recv_buf[..n], &mut loss_scratch);
                if count == 0 {
                    return Err(ReadXError::InvalidResponse);
                }
                pending.clear_all();
                for &seq in &loss_scratch[..count] {
                    if seq >= 1 && seq <= total {
                        pending.set(seq);
                    }
                }
            }
        }
    }
}
