use crate::segment::Block;
use lasso::{Spur, ThreadedRodeo};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Global interner for block header lines.
///
/// Entries are never released: every distinct header seen during the
/// process stays interned. Re-rendering the same buffer adds nothing.
static HEADERS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Identity of a block that survives edits to its body.
///
/// A block is identified by its header line (`graph LR`, `pie title Pets`)
/// plus its ordinal among earlier blocks with the same header. Editing the
/// body of one block, or of any other block, leaves every key unchanged;
/// editing a header or reordering same-header blocks does not.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockKey {
    header: Spur,
    ordinal: u32,
}

impl BlockKey {
    pub fn new(header: &str, ordinal: u32) -> Self {
        Self {
            header: HEADERS.get_or_intern(header),
            ordinal,
        }
    }

    pub fn header(&self) -> &str {
        HEADERS.resolve(&self.header)
    }

    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }

    /// Keys for a segmented buffer, one per block, in block order.
    pub fn for_blocks(blocks: &[Block<'_>]) -> Vec<BlockKey> {
        let mut seen: HashMap<&str, u32> = HashMap::new();
        blocks
            .iter()
            .map(|block| {
                let header = block.header();
                let ordinal = seen.entry(header).or_insert(0);
                let key = BlockKey::new(header, *ordinal);
                *ordinal += 1;
                key
            })
            .collect()
    }
}

impl fmt::Debug for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.header(), self.ordinal)
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.header(), self.ordinal)
    }
}
