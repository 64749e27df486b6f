use rtrb::{Consumer, Producer, RingBuffer};

/// Create a single-producer single-consumer sample ring sized for
/// `capacity` i16 samples. The pusher lives in the audio callback, the
/// popper in the blocking frame reader.
pub fn sample_ring(capacity: usize) -> (SamplePusher, SamplePopper) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        SamplePusher { producer },
        SamplePopper { consumer },
    )
}

/// Producer half, fed from the audio callback. Never blocks.
pub struct SamplePusher {
    producer: Producer<i16>,
}

impl SamplePusher {
    /// Write a chunk of samples. Returns false (dropping the whole chunk)
    /// when the ring cannot hold it; partial writes would break the
    /// fixed-frame ordering contract downstream.
    pub fn push(&mut self, samples: &[i16]) -> bool {
        let mut chunk = match self.producer.write_chunk(samples.len()) {
            Ok(chunk) => chunk,
            Err(_) => return false,
        };

        // The chunk may wrap around the ring; fill both slices.
        let (head, tail) = chunk.as_mut_slices();
        let split = head.len();
        head.copy_from_slice(&samples[..split]);
        tail.copy_from_slice(&samples[split..]);
        chunk.commit_all();
        true
    }
}

/// Consumer half, drained by the frame reader.
pub struct SamplePopper {
    consumer: Consumer<i16>,
}

impl SamplePopper {
    /// Move up to `buf.len()` samples out of the ring. Non-blocking;
    /// returns the number of samples copied.
    pub fn pop_into(&mut self, buf: &mut [i16]) -> usize {
        let available = self.consumer.slots().min(buf.len());
        if available == 0 {
            return 0;
        }

        // `available` slots were just observed, so the read cannot fail.
        let chunk = match self.consumer.read_chunk(available) {
            Ok(chunk) => chunk,
            Err(_) => return 0,
        };

        let (head, tail) = chunk.as_slices();
        let split = head.len();
        buf[..split].copy_from_slice(head);
        buf[split..split + tail.len()].copy_from_slice(tail);
        let taken = split + tail.len();
        chunk.commit_all();
        taken
    }

    /// Samples currently waiting in the ring.
    pub fn available(&self) -> usize {
        self.consumer.slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_pop_preserves_order() {
        let (mut pusher, mut popper) = sample_ring(1024);

        assert!(pusher.push(&[1, 2, 3, 4, 5]));

        let mut buf = [0i16; 8];
        let n = popper.pop_into(&mut buf);
        assert_eq!(n, 5);
        assert_eq!(&buf[..5], &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn full_ring_drops_whole_chunk() {
        let (mut pusher, mut popper) = sample_ring(16);

        assert!(!pusher.push(&[0i16; 20]));
        assert!(pusher.push(&[7i16; 16]));
        assert!(!pusher.push(&[9i16; 1]));

        let mut buf = [0i16; 16];
        assert_eq!(popper.pop_into(&mut buf), 16);
        assert!(buf.iter().all(|&s| s == 7));
    }

    #[test]
    fn pop_across_wraparound() {
        let (mut pusher, mut popper) = sample_ring(8);
        let mut buf = [0i16; 8];

        assert!(pusher.push(&[1i16; 6]));
        assert_eq!(popper.pop_into(&mut buf), 6);

        // Next write wraps; contents must still come out in order.
        assert!(pusher.push(&[2, 3, 4, 5]));
        assert_eq!(popper.pop_into(&mut buf), 4);
        assert_eq!(&buf[..4], &[2, 3, 4, 5]);
    }

    #[test]
    fn empty_ring_pops_nothing() {
        let (_pusher, mut popper) = sample_ring(8);
        let mut buf = [0i16; 4];
        assert_eq!(popper.pop_into(&mut buf), 0);
        assert_eq!(popper.available(), 0);
    }
}
