//! Press/move/release state machine.
//!
//! Transitions live in `TRANSITION_TABLE`; any (state, input) pair without a row leaves the
//! state unchanged and produces nothing.

use crate::models::geometry::PlanarVector;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Holding { origin: PlanarVector },
    Dragging { last: PlanarVector },
}

impl InteractionState {
    pub fn tag(&self) -> StateTag {
        match self {
            InteractionState::Idle => StateTag::Idle,
            InteractionState::Holding { .. } => StateTag::Holding,
            InteractionState::Dragging { .. } => StateTag::Dragging,
        }
    }

    /// Reference point for the next cursor delta.
    fn anchor(&self) -> Option<PlanarVector> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Holding { origin } => Some(*origin),
            InteractionState::Dragging { last } => Some(*last),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionInput {
    PressStarted(PlanarVector),
    PressMoved(PlanarVector),
    PressEnded(PlanarVector),
}

impl InteractionInput {
    pub fn tag(&self) -> InputTag {
        match self {
            InteractionInput::PressStarted(_) => InputTag::PressStarted,
            InteractionInput::PressMoved(_) => InputTag::PressMoved,
            InteractionInput::PressEnded(_) => InputTag::PressEnded,
        }
    }

    pub fn position(&self) -> PlanarVector {
        match self {
            InteractionInput::PressStarted(p)
            | InteractionInput::PressMoved(p)
            | InteractionInput::PressEnded(p) => *p,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionOutput {
    StartHold,
    MoveCursor(PlanarVector),
    PerformClick(PlanarVector),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Idle,
    Holding,
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTag {
    PressStarted,
    PressMoved,
    PressEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputTag {
    StartHold,
    /// Delta from the hold origin or from the last drag position.
    MoveCursor,
    PerformClick,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRow {
    pub from: StateTag,
    pub input: InputTag,
    pub to: StateTag,
    pub output: OutputTag,
}

const fn row(from: StateTag, input: InputTag, to: StateTag, output: OutputTag) -> TransitionRow {
    TransitionRow {
        from,
        input,
        to,
        output,
    }
}

pub const TRANSITION_TABLE: [TransitionRow; 5] = [
    row(StateTag::Idle, InputTag::PressStarted, StateTag::Holding, OutputTag::StartHold),
    row(StateTag::Holding, InputTag::PressMoved, StateTag::Dragging, OutputTag::MoveCursor),
    row(StateTag::Holding, InputTag::PressEnded, StateTag::Idle, OutputTag::PerformClick),
    row(StateTag::Dragging, InputTag::PressMoved, StateTag::Dragging, OutputTag::MoveCursor),
    row(StateTag::Dragging, InputTag::PressEnded, StateTag::Idle, OutputTag::Reset),
];

pub fn lookup(from: StateTag, input: InputTag) -> Option<&'static TransitionRow> {
    TRANSITION_TABLE
        .iter()
        .find(|row| row.from == from && row.input == input)
}

pub fn transition(
    state: InteractionState,
    input: InteractionInput,
) -> (InteractionState, Option<InteractionOutput>) {
    let Some(row) = lookup(state.tag(), input.tag()) else {
        return (state, None);
    };

    let position = input.position();
    let next = match row.to {
        StateTag::Idle => InteractionState::Idle,
        StateTag::Holding => InteractionState::Holding { origin: position },
        StateTag::Dragging => InteractionState::Dragging { last: position },
    };
    let output = match row.output {
        OutputTag::StartHold => InteractionOutput::StartHold,
        OutputTag::MoveCursor => {
            InteractionOutput::MoveCursor(position - state.anchor().unwrap_or(position))
        }
        OutputTag::PerformClick => InteractionOutput::PerformClick(position),
        OutputTag::Reset => InteractionOutput::Reset,
    };

    (next, Some(output))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn handle(&mut self, input: InteractionInput) -> Option<InteractionOutput> {
        let (next, output) = transition(self.state, input);
        if next.tag() != self.state.tag() {
            log::debug!("interaction: {:?} -> {:?}", self.state.tag(), next.tag());
        }
        self.state = next;
        output
    }

    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: PlanarVector = PlanarVector::new(3.0, 4.0);

    fn state_for(tag: StateTag) -> InteractionState {
        match tag {
            StateTag::Idle => InteractionState::Idle,
            StateTag::Holding => InteractionState::Holding {
                origin: PlanarVector::ZERO,
            },
            StateTag::Dragging => InteractionState::Dragging {
                last: PlanarVector::new(1.0, 1.0),
            },
        }
    }

    fn input_for(tag: InputTag) -> InteractionInput {
        match tag {
            InputTag::PressStarted => InteractionInput::PressStarted(P),
            InputTag::PressMoved => InteractionInput::PressMoved(P),
            InputTag::PressEnded => InteractionInput::PressEnded(P),
        }
    }

    #[test]
    fn table_rows_drive_transitions() {
        for row in TRANSITION_TABLE {
            let (next, output) = transition(state_for(row.from), input_for(row.input));
            assert_eq!(next.tag(), row.to, "{row:?}");
            let output = output.expect("table rows always produce output");
            let output_tag = match output {
                InteractionOutput::StartHold => OutputTag::StartHold,
                InteractionOutput::MoveCursor(_) => OutputTag::MoveCursor,
                InteractionOutput::PerformClick(_) => OutputTag::PerformClick,
                InteractionOutput::Reset => OutputTag::Reset,
            };
            assert_eq!(output_tag, row.output, "{row:?}");
        }
    }

    #[test]
    fn unlisted_pairs_are_ignored() {
        let states = [StateTag::Idle, StateTag::Holding, StateTag::Dragging];
        let inputs = [InputTag::PressStarted, InputTag::PressMoved, InputTag::PressEnded];
        let mut ignored = 0;
        for state_tag in states {
            for input_tag in inputs {
                if lookup(state_tag, input_tag).is_some() {
                    continue;
                }
                let state = state_for(state_tag);
                let (next, output) = transition(state, input_for(input_tag));
                assert_eq!(next, state);
                assert_eq!(output, None);
                ignored += 1;
            }
        }
        assert_eq!(ignored, 4);
    }

    #[test]
    fn first_move_is_relative_to_hold_origin_then_to_last_position() {
        let mut machine = InteractionMachine::new();
        assert_eq!(
            machine.handle(InteractionInput::PressStarted(PlanarVector::new(125.0, 90.0))),
            Some(InteractionOutput::StartHold)
        );
        assert_eq!(
            machine.handle(InteractionInput::PressMoved(PlanarVector::new(135.0, 90.0))),
            Some(InteractionOutput::MoveCursor(PlanarVector::new(10.0, 0.0)))
        );
        assert_eq!(
            machine.handle(InteractionInput::PressMoved(PlanarVector::new(135.0, 95.0))),
            Some(InteractionOutput::MoveCursor(PlanarVector::new(0.0, 5.0)))
        );
        assert_eq!(
            machine.handle(InteractionInput::PressEnded(PlanarVector::new(135.0, 95.0))),
            Some(InteractionOutput::Reset)
        );
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn release_while_holding_clicks() {
        let mut machine = InteractionMachine::new();
        machine.handle(InteractionInput::PressStarted(P));
        assert_eq!(
            machine.handle(InteractionInput::PressEnded(P)),
            Some(InteractionOutput::PerformClick(P))
        );
        assert_eq!(machine.state(), InteractionState::Idle);
    }
}
