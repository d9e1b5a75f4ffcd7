// This file is part of Opcannon.
//
// Opcannon is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Opcannon is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Opcannon.
// If not, see https://www.gnu.org/licenses/.

//! Dispatch trigger, driven by block notifications.
//!
//! The first observed block is skipped to let factory/account state settle
//! for one block. The second observed block fires the dispatch, exactly
//! once. Everything after that is ignored.

/// State of the dispatch trigger.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum BlockTrigger {
    /// No block observed yet. The next block is skipped as warm-up.
    AwaitingWarmupBlock,
    /// Warm-up block seen. The next block fires the dispatch.
    AwaitingDispatchBlock,
    /// Dispatch already fired. Further blocks are ignored.
    Fired,
}

/// Action the caller should take for a block notification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum TriggerAction {
    /// Warm-up block, take no dispatch action.
    Skip,
    /// Drain and send the pending batch now.
    Dispatch,
    /// Trigger already fired, nothing to do.
    Ignore,
}

impl BlockTrigger {
    pub(crate) fn new() -> Self {
        BlockTrigger::AwaitingWarmupBlock
    }

    /// Transition on a block notification and return the action to take.
    pub(crate) fn on_block(&mut self) -> TriggerAction {
        match self {
            BlockTrigger::AwaitingWarmupBlock => {
                *self = BlockTrigger::AwaitingDispatchBlock;
                TriggerAction::Skip
            }
            BlockTrigger::AwaitingDispatchBlock => {
                *self = BlockTrigger::Fired;
                TriggerAction::Dispatch
            }
            BlockTrigger::Fired => TriggerAction::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_second_block_dispatches() {
        let mut trigger = BlockTrigger::new();

        // blocks arriving as [1, 2, 3, 4]
        assert_eq!(trigger.on_block(), TriggerAction::Skip);
        assert_eq!(trigger.on_block(), TriggerAction::Dispatch);
        assert_eq!(trigger.on_block(), TriggerAction::Ignore);
        assert_eq!(trigger.on_block(), TriggerAction::Ignore);

        assert_eq!(trigger, BlockTrigger::Fired);
    }

    #[test]
    fn test_states_advance_in_order() {
        let mut trigger = BlockTrigger::new();
        assert_eq!(trigger, BlockTrigger::AwaitingWarmupBlock);
        trigger.on_block();
        assert_eq!(trigger, BlockTrigger::AwaitingDispatchBlock);
        trigger.on_block();
        assert_eq!(trigger, BlockTrigger::Fired);
    }
}
