use soroban_sdk::{Address, Env};

use crate::{accrual, storage, ContractError};

/// Materialise accrual for every registered stream up to the current ledger
/// timestamp and, when `account` is given, settle that account's share into
/// its checkpoint.
///
/// Must run before any change to balances, total stake or stream rates. The
/// asset list is scanned in full on every call; pools carry a handful of
/// reward tokens, so the linear cost is accepted.
pub fn checkpoint(env: &Env, account: Option<&Address>) -> Result<(), ContractError> {
    let now = env.ledger().timestamp();
    let total_staked = storage::total_staked(env);
    let retired = storage::is_retired(env);
    let balance = account.map_or(0, |account| storage::balance_of(env, account));

    for asset in storage::reward_assets(env).iter() {
        let mut stream = storage::load_stream(env, &asset)?;
        stream.accumulated_per_unit =
            accrual::reward_per_unit(env, &stream, total_staked, retired, now)?;
        stream.last_update = accrual::active_until(stream.period_end, now);
        storage::save_stream(env, &asset, &stream);

        if let Some(account) = account {
            let mut settled = storage::load_checkpoint(env, account, &asset);
            settled.accrued =
                accrual::earned(env, balance, stream.accumulated_per_unit, &settled, retired)?;
            settled.paid_per_unit = stream.accumulated_per_unit;
            storage::save_checkpoint(env, account, &asset, &settled);
        }
    }

    Ok(())
}

/// Read-only counterpart of [`checkpoint`] for a single account and stream.
pub fn pending(env: &Env, account: &Address, asset: &Address) -> Result<i128, ContractError> {
    let stream = storage::load_stream(env, asset)?;
    let retired = storage::is_retired(env);
    let per_unit = accrual::reward_per_unit(
        env,
        &stream,
        storage::total_staked(env),
        retired,
        env.ledger().timestamp(),
    )?;

    accrual::earned(
        env,
        storage::balance_of(env, account),
        per_unit,
        &storage::load_checkpoint(env, account, asset),
        retired,
    )
}
