//! Per-key metadata tracked by the index

/// Identifies one live editor; never reused within a cache instance
pub(crate) type EditorId = u64;

/// In-memory state of one cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Byte length of each committed slot file
    lengths: Vec<u64>,
    /// True once a commit has completed for this key
    readable: bool,
    /// Sequence number of the most recent commit
    sequence_number: u64,
    /// The live editor, if any
    current_editor: Option<EditorId>,
}

impl Entry {
    pub(crate) fn new(value_count: usize) -> Self {
        Self {
            lengths: vec![0; value_count],
            readable: false,
            sequence_number: 0,
            current_editor: None,
        }
    }

    pub fn lengths(&self) -> &[u64] {
        &self.lengths
    }

    /// Sum of all slot lengths
    pub fn total_length(&self) -> u64 {
        self.lengths
            .iter()
            .fold(0_u64, |total, length| total.saturating_add(*length))
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn is_being_edited(&self) -> bool {
        self.current_editor.is_some()
    }

    pub(crate) fn current_editor(&self) -> Option<EditorId> {
        self.current_editor
    }

    pub(crate) fn set_editor(&mut self, editor: Option<EditorId>) {
        self.current_editor = editor;
    }

    /// Whether trim may evict this entry
    pub(crate) fn is_evictable(&self) -> bool {
        self.readable && self.current_editor.is_none()
    }

    pub(crate) fn commit(&mut self, lengths: Vec<u64>, sequence_number: u64) {
        self.lengths = lengths;
        self.readable = true;
        self.sequence_number = sequence_number;
    }
}
