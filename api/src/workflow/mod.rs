//! The registration flow as a pure state machine. Each step maps a state
//! and an input to the next state plus the effects the caller must run;
//! the machine itself never touches the database or the gateway, so every
//! transition is deterministic and testable in memory.

use stride_db::models::RegistrationStatus;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkflowState {
    SelectingTicket,
    CollectingForm { free: bool },
    Reviewing { free: bool },
    AwaitingMethodSelection,
    OrderCreated,
    AwaitingGatewayResult,
    Completed,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkflowInput {
    SelectTicket { free: bool },
    SubmitForm,
    ConfirmReview,
    SelectPaymentMethod,
    OrderOpened,
    GatewayApproved,
    GatewayDeclined,
    Retry,
    Back,
}

/// Side effects the controller executes after a successful transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkflowEffect {
    CreateRegistration,
    ReleaseTicket,
    PersistFormAnswers,
    CreateGatewayOrder,
    MarkPaymentFailed,
    FinalizeRegistration,
}

#[derive(Debug, PartialEq)]
pub enum WorkflowError {
    InvalidTransition {
        state: &'static str,
        input: &'static str,
    },
    /// Going back is only legal before a gateway order exists
    BackUnavailable,
}

impl std::fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            WorkflowError::InvalidTransition { state, input } => {
                write!(f, "Input {} is not valid in state {}", input, state)
            }
            WorkflowError::BackUnavailable => {
                write!(f, "Cannot go back once a payment order has been created")
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

impl WorkflowState {
    fn name(&self) -> &'static str {
        match self {
            WorkflowState::SelectingTicket => "SelectingTicket",
            WorkflowState::CollectingForm { .. } => "CollectingForm",
            WorkflowState::Reviewing { .. } => "Reviewing",
            WorkflowState::AwaitingMethodSelection => "AwaitingMethodSelection",
            WorkflowState::OrderCreated => "OrderCreated",
            WorkflowState::AwaitingGatewayResult => "AwaitingGatewayResult",
            WorkflowState::Completed => "Completed",
            WorkflowState::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        *self == WorkflowState::Completed
    }
}

impl WorkflowInput {
    fn name(&self) -> &'static str {
        match self {
            WorkflowInput::SelectTicket { .. } => "SelectTicket",
            WorkflowInput::SubmitForm => "SubmitForm",
            WorkflowInput::ConfirmReview => "ConfirmReview",
            WorkflowInput::SelectPaymentMethod => "SelectPaymentMethod",
            WorkflowInput::OrderOpened => "OrderOpened",
            WorkflowInput::GatewayApproved => "GatewayApproved",
            WorkflowInput::GatewayDeclined => "GatewayDeclined",
            WorkflowInput::Retry => "Retry",
            WorkflowInput::Back => "Back",
        }
    }
}

pub fn step(
    state: WorkflowState,
    input: WorkflowInput,
) -> Result<(WorkflowState, Vec<WorkflowEffect>), WorkflowError> {
    use self::WorkflowEffect::*;
    use self::WorkflowInput as In;
    use self::WorkflowState as St;

    let transition = match (state, input) {
        (St::SelectingTicket, In::SelectTicket { free }) => {
            (St::CollectingForm { free }, vec![CreateRegistration])
        }
        (St::CollectingForm { free }, In::SubmitForm) => (St::Reviewing { free }, vec![PersistFormAnswers]),
        // Price zero skips the whole payment leg
        (St::Reviewing { free: true }, In::ConfirmReview) => (St::Completed, vec![FinalizeRegistration]),
        (St::Reviewing { free: false }, In::ConfirmReview) => (St::AwaitingMethodSelection, vec![]),
        (St::AwaitingMethodSelection, In::SelectPaymentMethod) => (St::OrderCreated, vec![CreateGatewayOrder]),
        (St::OrderCreated, In::OrderOpened) => (St::AwaitingGatewayResult, vec![]),
        (St::AwaitingGatewayResult, In::GatewayApproved) => (St::Completed, vec![FinalizeRegistration]),
        (St::AwaitingGatewayResult, In::GatewayDeclined) => (St::Failed, vec![MarkPaymentFailed]),
        // A retry goes back to method selection; the next attempt creates
        // a fresh payment row and a fresh gateway order
        (St::Failed, In::Retry) => (St::AwaitingMethodSelection, vec![]),

        (St::CollectingForm { .. }, In::Back) => (St::SelectingTicket, vec![ReleaseTicket]),
        (St::Reviewing { free }, In::Back) => (St::CollectingForm { free }, vec![]),
        (St::AwaitingMethodSelection, In::Back) => (St::Reviewing { free: false }, vec![]),
        (
            St::OrderCreated | St::AwaitingGatewayResult | St::Completed | St::Failed,
            In::Back,
        ) => return Err(WorkflowError::BackUnavailable),

        (state, input) => {
            return Err(WorkflowError::InvalidTransition {
                state: state.name(),
                input: input.name(),
            })
        }
    };

    Ok(transition)
}

/// Maps a stored registration back onto the flow. HTTP is stateless, so
/// each request re-derives the machine state from the rows and then asks
/// `step` whether the requested input is legal. A cancelled registration
/// has left the flow and has no state.
pub fn derive_state(status: RegistrationStatus, answers_complete: bool, free: bool) -> Option<WorkflowState> {
    match status {
        RegistrationStatus::Cancelled => None,
        RegistrationStatus::Confirmed => Some(WorkflowState::Completed),
        RegistrationStatus::Pending if answers_complete => Some(WorkflowState::Reviewing { free }),
        RegistrationStatus::Pending => Some(WorkflowState::CollectingForm { free }),
    }
}

#[cfg(test)]
mod tests {
    use super::WorkflowEffect::*;
    use super::WorkflowInput as In;
    use super::WorkflowState as St;
    use super::*;

    fn run(start: St, inputs: &[In]) -> (St, Vec<WorkflowEffect>) {
        let mut state = start;
        let mut effects = Vec::new();
        for input in inputs {
            let (next, mut step_effects) = step(state, *input).expect("transition should be valid");
            state = next;
            effects.append(&mut step_effects);
        }
        (state, effects)
    }

    #[test]
    fn derived_state_tracks_the_stored_registration() {
        assert_eq!(derive_state(RegistrationStatus::Cancelled, true, false), None);
        assert_eq!(derive_state(RegistrationStatus::Confirmed, true, false), Some(St::Completed));
        assert_eq!(
            derive_state(RegistrationStatus::Pending, false, true),
            Some(St::CollectingForm { free: true })
        );
        assert_eq!(
            derive_state(RegistrationStatus::Pending, true, false),
            Some(St::Reviewing { free: false })
        );
    }

    #[test]
    fn payment_request_replays_review_and_method_selection() {
        // The payment endpoint stands for confirming the review and
        // picking the gateway in one request
        let state = derive_state(RegistrationStatus::Pending, true, false).unwrap();
        let (state, _) = step(state, In::ConfirmReview).unwrap();
        let (state, effects) = step(state, In::SelectPaymentMethod).unwrap();
        assert_eq!(state, St::OrderCreated);
        assert_eq!(effects, vec![CreateGatewayOrder]);

        // Already confirmed: nothing left to confirm or pay for
        let confirmed = derive_state(RegistrationStatus::Confirmed, true, false).unwrap();
        assert!(step(confirmed, In::ConfirmReview).is_err());

        // Form still outstanding: payment is premature
        let collecting = derive_state(RegistrationStatus::Pending, false, false).unwrap();
        assert!(step(collecting, In::ConfirmReview).is_err());
    }

    #[test]
    fn paid_happy_path() {
        let (state, effects) = run(
            St::SelectingTicket,
            &[
                In::SelectTicket { free: false },
                In::SubmitForm,
                In::ConfirmReview,
                In::SelectPaymentMethod,
                In::OrderOpened,
                In::GatewayApproved,
            ],
        );
        assert_eq!(state, St::Completed);
        assert_eq!(
            effects,
            vec![CreateRegistration, PersistFormAnswers, CreateGatewayOrder, FinalizeRegistration]
        );
    }

    #[test]
    fn free_ticket_short_circuits_payment() {
        let (state, effects) = run(
            St::SelectingTicket,
            &[In::SelectTicket { free: true }, In::SubmitForm, In::ConfirmReview],
        );
        assert_eq!(state, St::Completed);
        assert_eq!(
            effects,
            vec![CreateRegistration, PersistFormAnswers, FinalizeRegistration]
        );
        // A free flow never asks for a gateway order
        assert!(!effects.contains(&CreateGatewayOrder));
    }

    #[test]
    fn declined_payment_can_retry_with_a_new_order() {
        let (state, effects) = run(
            St::SelectingTicket,
            &[
                In::SelectTicket { free: false },
                In::SubmitForm,
                In::ConfirmReview,
                In::SelectPaymentMethod,
                In::OrderOpened,
                In::GatewayDeclined,
                In::Retry,
                In::SelectPaymentMethod,
                In::OrderOpened,
                In::GatewayApproved,
            ],
        );
        assert_eq!(state, St::Completed);
        // Two distinct gateway orders were requested along the way
        let order_count = effects.iter().filter(|e| **e == CreateGatewayOrder).count();
        assert_eq!(order_count, 2);
        assert_eq!(effects.iter().filter(|e| **e == MarkPaymentFailed).count(), 1);
    }

    #[test]
    fn back_walks_the_flow_in_reverse_before_payment() {
        let (state, effects) = run(
            St::SelectingTicket,
            &[
                In::SelectTicket { free: false },
                In::SubmitForm,
                In::ConfirmReview,
                In::Back,
                In::Back,
                In::Back,
            ],
        );
        assert_eq!(state, St::SelectingTicket);
        assert!(effects.contains(&ReleaseTicket));
    }

    #[test]
    fn back_is_rejected_once_an_order_exists() {
        for state in [St::OrderCreated, St::AwaitingGatewayResult, St::Completed, St::Failed] {
            assert_eq!(step(state, In::Back), Err(WorkflowError::BackUnavailable));
        }
    }

    #[test]
    fn out_of_order_inputs_are_rejected() {
        assert!(matches!(
            step(St::SelectingTicket, In::ConfirmReview),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            step(St::Completed, In::GatewayApproved),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert!(matches!(
            step(St::Reviewing { free: false }, In::SelectPaymentMethod),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        // A gateway result can only land after the order is opened
        assert!(matches!(
            step(St::OrderCreated, In::GatewayApproved),
            Err(WorkflowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn completed_is_the_only_terminal_state() {
        assert!(St::Completed.is_terminal());
        assert!(!St::Failed.is_terminal());
        // Failed re-enters the flow through a retry
        let (state, _) = step(St::Failed, In::Retry).unwrap();
        assert_eq!(state, St::AwaitingMethodSelection);
    }

    #[test]
    fn transitions_are_deterministic() {
        let first = step(St::SelectingTicket, In::SelectTicket { free: false }).unwrap();
        let second = step(St::SelectingTicket, In::SelectTicket { free: false }).unwrap();
        assert_eq!(first, second);
    }
}
