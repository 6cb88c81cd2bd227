//! WRITE_X: the server-receiver half of the X-Protocol. Accumulates
//! chunks from a client into a caller-owned buffer, requesting
//! retransmission of anything missing after a timeout.

use crate::chunk::{encode_loss_list, Bitmask, Header};
use crate::config::WriteXConfig;
use crate::error::WriteXError;
use crate::mtu::{data_chunk_size, MAX_MTU};
use crate::transport::Transport;

fn decode_header(bytes: &[u8]) -> Result<(Header, &[u8]), ()> {
    if bytes.len() < 3 {
        return Err(());
    }
    let hdr_bytes: [u8; 3] = bytes[..3].try_into().unwrap();
    let hdr = Header::decode(&hdr_bytes);
    Ok((hdr, &bytes[3..]))
}

/// Run the WRITE_X state machine to completion: accept chunks into
/// `recv_buf` until every chunk of the transfer has arrived, then ACK
/// and return the reconstructed slice.
///
/// `recv_buf` must be large enough to hold `total * data_chunk_size`
/// bytes once `total` is learned from the first chunk.
pub fn run<'b, T>(
    transport: &mut T,
    recv_buf: &'b mut [u8],
    config: WriteXConfig,
) -> Result<&'b [u8], WriteXError<T::SendError, T::RecvError>>
where
    T: Transport,
{
    let dcs = data_chunk_size(config.mtu) as usize;
    let max_frame = config.mtu as usize - 3;
    let mut recv_frame = [0u8; MAX_MTU as usize];

    // WaitFirst
    let (total, mut mask, first_len) = 'wait_first: {
        let mut timeouts = 0u32;
        loop {
            match transport
                .recv(&mut recv_frame, config.timeout_ms)
                .map_err(WriteXError::Recv)?
            {
                Some(n) => {
                    let (hdr, _) = decode_header(&recv_frame[..n]).map_err(|_| WriteXError::InvalidPacket)?;
                    hdr.validate().map_err(|_| WriteXError::InvalidHeader)?;
                    let needed = hdr.total as usize * dcs;
                    if recv_buf.len() < needed {
                        return Err(WriteXError::BufferTooSmall);
                    }
                    let mask = Bitmask::init_clear(hdr.total);
                    break 'wait_first (hdr.total, mask, n);
                }
                None => {
                    timeouts += 1;
                    if timeouts > config.max_retries {
                        return Err(WriteXError::Timeout);
                    }
                    // total still unknown: nothing to build a loss list from
                    continue;
                }
            }
        }
    };

    #[cfg(feature = "defmt")]
    defmt::trace!("write_x: learned total={}", total);

    let mut last_chunk_len = dcs;
    let mut first_frame_len = Some(first_len);
    let mut timeouts = 0u32;

    loop {
        // the WaitFirst iteration already consumed one frame; apply it
        // here instead of re-receiving.
        let frame: &[u8] = if let Some(n) = first_frame_len.take() {
            &recv_frame[..n]
        } else {
            match transport
                .recv(&mut recv_frame, config.timeout_ms)
                .map_err(WriteXError::Recv)?
            {
                Some(n) => &recv_frame[..n],
                None => {
                    timeouts += 1;
                    if timeouts > config.max_retries {
                        return Err(WriteXError::Timeout);
                    }
                    let mut missing = [0u16; MAX_MTU as usize / 2];
                    let count = mask.collect_missing(&mut missing);
                    let max_entries = max_frame / 2;
                    let count = count.min(max_entries);
                    let mut loss_buf = [0u8; MAX_MTU as usize];
                    let loss = encode_loss_list(&missing[..count], &mut loss_buf);
                    transport.send(loss).map_err(WriteXError::Send)?;
                    continue;
                }
            }
        };

        if frame.len() > max_frame {
            return Err(WriteXError::ChunkTooLarge);
        }
        let (hdr, payload) = decode_header(frame).map_err(|_| WriteXError::InvalidPacket)?;
        hdr.validate().map_err(|_| WriteXError::InvalidHeader)?;
        if hdr.total != total {
            return Err(WriteXError::TotalMismatch);
        }

        let start = (hdr.seq - 1) as usize * dcs;
        recv_buf[start..start + payload.len()].copy_from_slice(payload);
        if hdr.seq == total {
            last_chunk_len = payload.len();
        }
        mask.set(hdr.seq);
        timeouts = 0;

        if mask.is_complete() {
            transport
                .send(&crate::chunk::ACK_MAGIC)
                .map_err(WriteXError::Send)?;
            #[cfg(feature = "defmt")]
            defmt::trace!("write_x: all chunks received, ACK sent");
            let end = (total as usize - 1) * dcs + last_chunk_len;
            return Ok(&recv_buf[..end]);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_support::{MockTransport, ScriptedRecv};

    fn cfg(mtu: u16, timeout_ms: u32, max_retries: u32) -> WriteXConfig {
        WriteXConfig::new(mtu, timeout_ms, max_retries).unwrap()
    }

    fn chunks(data: &[u8], mtu: u16) -> Vec<Vec<u8>> {
        let dcs = data_chunk_size(mtu) as usize;
        let total = data.len().div_ceil(dcs) as u16;
        (1..=total)
            .map(|seq| {
                let start = (seq - 1) as usize * dcs;
                let end = (start + dcs).min(data.len());
                let mut frame = Header { total, seq }.encode().to_vec();
                frame.extend_from_slice(&data[start..end]);
                frame
            })
            .collect()
    }

    /// S3: happy path, in order.
    #[test]
    fn s3_happy_path() {
        let data = vec![0x42u8; 40];
        let script = chunks(&data, 50)
            .into_iter()
            .map(ScriptedRecv::Data)
            .collect();
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 1024];
        let result = run(&mut transport, &mut buf, cfg(50, 1000, 3)).unwrap();
        assert_eq!(result, &data[..]);
        assert_eq!(transport.sent.last().unwrap(), &crate::chunk::ACK_MAGIC);
    }

    /// S4: timeout recovers missing chunks.
    #[test]
    fn s4_timeout_recovery() {
        let data = vec![0x7u8; 49];
        let all = chunks(&data, 30);
        let mut script = vec![ScriptedRecv::Data(all[0].clone()), ScriptedRecv::Timeout];
        script.push(ScriptedRecv::Data(all[1].clone()));
        script.push(ScriptedRecv::Data(all[2].clone()));
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 1024];
        let result = run(&mut transport, &mut buf, cfg(30, 1000, 3)).unwrap();
        assert_eq!(result, &data[..]);
        // exactly one loss-list send before the ACK
        assert_eq!(transport.sent.len(), 2);
        let loss = &transport.sent[0];
        assert_eq!(loss.len(), 4);
        assert_eq!(u16::from_be_bytes([loss[0], loss[1]]), 2);
        assert_eq!(u16::from_be_bytes([loss[2], loss[3]]), 3);
    }

    #[test]
    fn duplicate_chunks_are_idempotent() {
        let data = vec![0xABu8; 40];
        let all = chunks(&data, 50);
        let script = vec![
            ScriptedRecv::Data(all[0].clone()),
            ScriptedRecv::Data(all[0].clone()),
        ];
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 1024];
        let result = run(&mut transport, &mut buf, cfg(50, 1000, 3)).unwrap();
        assert_eq!(result, &data[..]);
    }

    #[test]
    fn out_of_order_chunks_reconstruct_correctly() {
        let data = (0u8..100).collect::<Vec<_>>();
        let mut all = chunks(&data, 30);
        all.reverse();
        let script = all.into_iter().map(ScriptedRecv::Data).collect();
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 1024];
        let result = run(&mut transport, &mut buf, cfg(30, 1000, 3)).unwrap();
        assert_eq!(result, &data[..]);
    }

    #[test]
    fn buffer_too_small_errors() {
        let data = vec![0u8; 100];
        let script = chunks(&data, 30).into_iter().map(ScriptedRecv::Data).collect();
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 4];
        let err = run(&mut transport, &mut buf, cfg(30, 1000, 3)).unwrap_err();
        assert_eq!(err, WriteXError::BufferTooSmall);
    }

    #[test]
    fn total_mismatch_errors() {
        let mut frame1 = Header { total: 3, seq: 1 }.encode().to_vec();
        frame1.extend_from_slice(&[1, 2]);
        let mut frame2 = Header { total: 4, seq: 2 }.encode().to_vec();
        frame2.extend_from_slice(&[3, 4]);
        let script = vec![ScriptedRecv::Data(frame1), ScriptedRecv::Data(frame2)];
        let mut transport = MockTransport::new(script);
        let mut buf = vec![0u8; 1024];
        let err = run(&mut transport, &mut buf, cfg(50, 1000, 3)).unwrap_err();
        assert_eq!(err, WriteXError::TotalMismatch);
    }

    #[test]
    fn first_wait_timeout_exhausts_retries() {
        let mut transport =
            MockTransport::new(vec![ScriptedRecv::Timeout, ScriptedRecv::Timeout]);
        let mut buf = vec![0u8; 1024];
        let err = run(&mut transport, &mut buf, cfg(50, 1000, 1)).unwrap_err();
        assert_eq!(err, WriteXError::Timeout);
    }
}
