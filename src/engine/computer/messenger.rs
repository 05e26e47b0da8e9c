// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::structure::VertexId;

/// Message exchange for one vertex during one round.
///
/// Messages sent in round `n` are delivered in round `n + 1`. Nothing is
/// delivered within the round that sent it.
pub struct Messenger<'a, M> {
    incoming: Vec<M>,
    outbox: &'a mut Vec<(VertexId, M)>,
}

impl<'a, M> Messenger<'a, M> {
    pub(crate) fn new(incoming: Vec<M>, outbox: &'a mut Vec<(VertexId, M)>) -> Self {
        Self { incoming, outbox }
    }

    /// Takes every message delivered to this vertex this round.
    pub fn receive(&mut self) -> Vec<M> {
        std::mem::take(&mut self.incoming)
    }

    pub fn send(&mut self, target: VertexId, message: M) {
        self.outbox.push((target, message));
    }

    /// Messages sent so far by this vertex in this round.
    pub fn sent(&self) -> usize {
        self.outbox.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receive_drains_incoming() {
        let mut outbox = Vec::new();
        let mut messenger = Messenger::new(vec![1, 2], &mut outbox);
        assert_eq!(messenger.receive(), vec![1, 2]);
        assert!(messenger.receive().is_empty());
        messenger.send(VertexId(3), 9);
        assert_eq!(messenger.sent(), 1);
        assert_eq!(outbox, vec![(VertexId(3), 9)]);
    }
}
