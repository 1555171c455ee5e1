use crate::Operation;

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
enum Kind {
    // Declared first so calls sort before returns sharing a timestamp.
    Call,
    Return,
}

/// A doubly linked list of the call and return entries of a sub-history, ordered by time.
///
/// Node `0` is a sentinel head. A call node can be "lifted" out of the list together with its
/// matching return node and later "unlifted" back into place, provided lifts and unlifts happen
/// in LIFO order (the removed nodes keep their stale links, dancing-links style).
#[derive(Debug)]
pub(crate) struct Entries {
    kind: Vec<Kind>,
    matched: Vec<usize>,
    next: Vec<Option<usize>>,
    op: Vec<usize>,
    prev: Vec<usize>,
}

impl Entries {
    /// Builds the list for the operations at `indices`. The `op` of each node is the position
    /// within `indices`, not the index into `history`.
    pub(crate) fn new<I, O>(history: &[Operation<I, O>], indices: &[usize]) -> Self {
        let mut sorted: Vec<(i64, Kind, usize)> = Vec::with_capacity(2 * indices.len());
        for (local, &i) in indices.iter().enumerate() {
            sorted.push((history[i].call, Kind::Call, local));
            sorted.push((history[i].ret, Kind::Return, local));
        }
        sorted.sort_by_key(|(time, kind, _)| (*time, *kind));

        let len = sorted.len() + 1;
        let mut entries = Entries {
            kind: Vec::with_capacity(len),
            matched: vec![0; len],
            next: Vec::with_capacity(len),
            op: Vec::with_capacity(len),
            prev: Vec::with_capacity(len),
        };
        entries.kind.push(Kind::Call); // sentinel, never inspected
        entries.op.push(usize::MAX);
        let mut call_node = vec![0; indices.len()];
        for (node, (_time, kind, local)) in sorted.into_iter().enumerate().map(|(n, e)| (n + 1, e))
        {
            entries.kind.push(kind);
            entries.op.push(local);
            match kind {
                Kind::Call => call_node[local] = node,
                Kind::Return => {
                    entries.matched[call_node[local]] = node;
                    entries.matched[node] = call_node[local];
                }
            }
        }
        for node in 0..len {
            entries.next.push((node + 1 < len).then_some(node + 1));
            entries.prev.push(node.saturating_sub(1));
        }
        entries
    }

    pub(crate) fn first(&self) -> Option<usize> {
        self.next[0]
    }

    pub(crate) fn next(&self, node: usize) -> Option<usize> {
        self.next[node]
    }

    pub(crate) fn is_call(&self, node: usize) -> bool {
        self.kind[node] == Kind::Call
    }

    pub(crate) fn op(&self, node: usize) -> usize {
        self.op[node]
    }

    pub(crate) fn lift(&mut self, call: usize) {
        self.unlink(call);
        self.unlink(self.matched[call]);
    }

    pub(crate) fn unlift(&mut self, call: usize) {
        self.relink(self.matched[call]);
        self.relink(call);
    }

    fn unlink(&mut self, node: usize) {
        let (prev, next) = (self.prev[node], self.next[node]);
        self.next[prev] = next;
        if let Some(next) = next {
            self.prev[next] = prev;
        }
    }

    fn relink(&mut self, node: usize) {
        let (prev, next) = (self.prev[node], self.next[node]);
        self.next[prev] = Some(node);
        if let Some(next) = next {
            self.prev[next] = node;
        }
    }
}
