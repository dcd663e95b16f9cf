use std::io::BufRead;
use std::str::FromStr;

pub type ReadId = u32;
pub type Position = u32;

/// Marks an anchor that starts its chain.
pub const NO_PREDECESSOR: i32 = -1;

/// A single matching position pair between a query read and a target read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchor {
    pub query_read_id: ReadId,
    pub target_read_id: ReadId,
    pub query_position_in_read: Position,
    pub target_position_in_read: Position,
}

impl Anchor {
    pub fn new(
        query_read_id: ReadId,
        query_position_in_read: Position,
        target_read_id: ReadId,
        target_position_in_read: Position,
    ) -> Self {
        Anchor {
            query_read_id,
            target_read_id,
            query_position_in_read,
            target_position_in_read,
        }
    }

    /// Both anchors describe the same (query, target) read pair.
    pub fn same_read_pair(&self, other: &Anchor) -> bool {
        self.query_read_id == other.query_read_id && self.target_read_id == other.target_read_id
    }
}

/// Decodes a predecessor link; `None` for the chain-start sentinel.
#[inline]
pub fn predecessor_index(link: i32) -> Option<usize> {
    if link < 0 {
        None
    } else {
        Some(link as usize)
    }
}

/// Walks a chain backwards from `terminal`, yielding anchor indices down to the chain
/// start.
pub fn backtrace(predecessor: &[i32], terminal: usize) -> impl Iterator<Item = usize> + '_ {
    std::iter::successors(Some(terminal), move |&index| {
        predecessor_index(predecessor[index])
    })
}

/// One line of anchor input: the anchor plus the DP results for it.
///
/// Columns are whitespace separated:
///
/// ```text
/// query_read_id target_read_id query_pos target_pos score predecessor
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorRecord {
    pub anchor: Anchor,
    pub score: f32,
    pub predecessor: i32,
}

impl FromStr for AnchorRecord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split_whitespace().collect();
        if fields.len() != 6 {
            anyhow::bail!("expected 6 fields, found {}: {}", fields.len(), s);
        }

        let query_read_id = fields[0].parse::<ReadId>()?;
        let target_read_id = fields[1].parse::<ReadId>()?;
        let query_position_in_read = fields[2].parse::<Position>()?;
        let target_position_in_read = fields[3].parse::<Position>()?;
        let score = fields[4].parse::<f32>()?;
        if !score.is_finite() {
            anyhow::bail!("score must be finite, found {}", fields[4]);
        }
        let predecessor = fields[5].parse::<i32>()?;

        Ok(AnchorRecord {
            anchor: Anchor {
                query_read_id,
                target_read_id,
                query_position_in_read,
                target_position_in_read,
            },
            score,
            predecessor,
        })
    }
}

/// Column-oriented view of a batch of anchor records, as the engine consumes it.
#[derive(Debug, Clone, Default)]
pub struct AnchorBatch {
    pub anchors: Vec<Anchor>,
    pub score: Vec<f32>,
    pub predecessor: Vec<i32>,
}

impl AnchorBatch {
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn push(&mut self, record: AnchorRecord) {
        self.anchors.push(record.anchor);
        self.score.push(record.score);
        self.predecessor.push(record.predecessor);
    }
}

/// Reads anchor records, skipping blank lines and `#` comments.
pub fn read_anchor_records<R: BufRead>(reader: R) -> anyhow::Result<AnchorBatch> {
    let mut batch = AnchorBatch::default();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let record = AnchorRecord::from_str(line)
            .map_err(|e| anyhow::anyhow!("line {}: {}", lineno + 1, e))?;
        batch.push(record);
    }

    Ok(batch)
}
