//! Ordered block editor behind the campaign flow builder.
//!
//! A campaign's flow is a plain ordered list. Edits never check whether
//! neighbouring actions make sense together; the only guarantees are that
//! block ids stay unique and that reordering is a permutation of what is
//! already there.

use std::collections::HashSet;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Block, BlockDraft};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence {
    blocks: Vec<Block>,
}

impl Sequence {
    /// Builds a sequence from a full client-supplied list, as sent on save.
    pub fn from_drafts(drafts: Vec<BlockDraft>) -> Result<Self> {
        let blocks: Vec<Block> = drafts.into_iter().map(BlockDraft::into_block).collect();
        let mut seen = HashSet::with_capacity(blocks.len());
        for block in &blocks {
            if !seen.insert(block.id) {
                return Err(AppError::BadRequest(format!(
                    "Duplicate block id {} in sequence",
                    block.id
                )));
            }
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    fn position(&self, id: Uuid) -> Result<usize> {
        self.blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| AppError::not_found("Block", id))
    }

    /// Appends a block at the end of the flow.
    pub fn append(&mut self, draft: BlockDraft) -> Result<&Block> {
        let block = draft.into_block();
        if self.blocks.iter().any(|b| b.id == block.id) {
            return Err(AppError::BadRequest(format!(
                "Block {} already exists in sequence",
                block.id
            )));
        }
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    pub fn remove(&mut self, id: Uuid) -> Result<Block> {
        let index = self.position(id)?;
        Ok(self.blocks.remove(index))
    }

    /// Swaps the blocks at two positions.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.blocks.len();
        if a >= len || b >= len {
            return Err(AppError::BadRequest(format!(
                "Position out of range: sequence has {} blocks",
                len
            )));
        }
        self.blocks.swap(a, b);
        Ok(())
    }

    /// Moves one block to `to`, shifting the blocks in between. Targets past
    /// the end place the block last.
    pub fn move_block(&mut self, id: Uuid, to: usize) -> Result<()> {
        let from = self.position(id)?;
        let block = self.blocks.remove(from);
        let to = to.min(self.blocks.len());
        self.blocks.insert(to, block);
        Ok(())
    }

    /// Rearranges the blocks into `order`, which must name every current block
    /// exactly once.
    pub fn reorder(&mut self, order: &[Uuid]) -> Result<()> {
        if order.len() != self.blocks.len() {
            return Err(AppError::BadRequest(format!(
                "Reorder must list all {} blocks, got {}",
                self.blocks.len(),
                order.len()
            )));
        }

        let mut seen = HashSet::with_capacity(order.len());
        for id in order {
            if !seen.insert(*id) || !self.blocks.iter().any(|b| b.id == *id) {
                return Err(AppError::BadRequest(format!(
                    "Reorder references unknown or repeated block {}",
                    id
                )));
            }
        }

        let mut remaining = std::mem::take(&mut self.blocks);
        for id in order {
            if let Some(index) = remaining.iter().position(|b| b.id == *id) {
                self.blocks.push(remaining.swap_remove(index));
            }
        }
        Ok(())
    }
}

impl From<Vec<Block>> for Sequence {
    fn from(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}
