use outback::{
    capability::OutcomeCapability,
    dispatcher::Dispatcher,
    error::{DispatchError, PolicyError},
    policy::{InclusionPolicy, TargetDescriptor},
};
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Transfer {
    Completed,
    InsufficientFunds,
}

/// Use case holding the capability as a plain field.
struct TransferFunds {
    outcomes: OutcomeCapability,
    balance: u64,
}

impl TransferFunds {
    fn new(policy: &InclusionPolicy, balance: u64) -> Result<Self, PolicyError> {
        let target = TargetDescriptor::new("TransferFunds").category("use_case");

        Ok(Self {
            outcomes: OutcomeCapability::attach(policy, target)?,
            balance,
        })
    }

    fn transfer<'h, R>(
        &mut self,
        amount: u64,
        on: impl FnOnce(&mut Dispatcher<'h, Transfer, R>) -> Result<(), DispatchError>,
    ) -> Result<R, DispatchError> {
        let balance = &mut self.balance;
        self.outcomes.with_handlers(on, |outcomes| {
            if *balance < amount {
                return outcomes.trigger(Transfer::InsufficientFunds, (*balance,));
            }
            *balance -= amount;
            outcomes.trigger(Transfer::Completed, (amount, *balance))
        })
    }
}

fn describe(use_case: &mut TransferFunds, amount: u64) -> Result<String, DispatchError> {
    use_case.transfer(amount, |on| {
        on.of(Transfer::Completed, |amount: u64, left: u64| {
            format!("sent {}, {} left", amount, left)
        })?
        .of(Transfer::InsufficientFunds, |balance: u64| {
            format!("only {} available", balance)
        })?;
        Ok(())
    })
}

#[test]
fn test_capability_runs_sessions() -> anyhow::Result<()> {
    let mut use_case = TransferFunds::new(&InclusionPolicy::default(), 100)?;

    assert_eq!(describe(&mut use_case, 60)?, "sent 60, 40 left");
    assert_eq!(describe(&mut use_case, 60)?, "only 40 available");
    assert_eq!(use_case.outcomes.target().name, "TransferFunds");
    Ok(())
}

#[test]
fn test_capability_returning() -> anyhow::Result<()> {
    let use_case = TransferFunds::new(&InclusionPolicy::default(), 0)?;

    let outcome = use_case
        .outcomes
        .returning(|outcomes| outcomes.trigger(Transfer::InsufficientFunds, (0u64,)))?
        .expect("triggered outcome");
    assert!(outcome.is(&Transfer::InsufficientFunds));
    Ok(())
}

#[test]
fn test_attach_rejects_denied_targets() {
    let policy = InclusionPolicy::default().allow("service");

    assert_eq!(
        TransferFunds::new(&policy, 1).err(),
        Some(PolicyError::NotAllowed {
            target: "TransferFunds".into(),
            allowed: vec!["service".into()],
        })
    );

    let model = TargetDescriptor::new("Account").category("model").category("service");
    assert!(matches!(
        OutcomeCapability::attach(&policy, model),
        Err(PolicyError::Denied { .. })
    ));
}

#[test]
fn test_policy_from_path() -> anyhow::Result<()> {
    let path = std::env::temp_dir().join(format!("outback-policy-{}.json", std::process::id()));
    std::fs::File::create(&path)?.write_all(br#"{"deny":["legacy"],"allow":["use_case"]}"#)?;

    let policy = InclusionPolicy::from_path(&path)?;
    std::fs::remove_file(&path)?;

    assert_eq!(policy.deny, vec!["legacy"]);
    assert!(policy.is_permitted(&TargetDescriptor::new("TransferFunds").category("use_case")));
    assert!(!policy.is_permitted(&TargetDescriptor::new("Importer").category("legacy")));
    assert!(InclusionPolicy::from_path(&path).is_err());
    Ok(())
}
