use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::{AccountCheckpoint, Config, ContractError, RewardStream};

const INSTANCE_LIFETIME_THRESHOLD: u32 = 17_280;
const INSTANCE_BUMP_AMOUNT: u32 = 120_960;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 17_280;
const PERSISTENT_BUMP_AMOUNT: u32 = 120_960;

/// Namespace for all contract storage keys.
#[contracttype]
pub enum DataKey {
    Config,       // Instance storage: stake token, roles, sweep cooldown.
    PendingAdmin, // Instance storage: proposed admin awaiting acceptance.
    Retired,      // Instance storage: one-way retirement flag.
    TotalStaked,  // Instance storage: sum of all balances.
    RewardAssets, // Instance storage: append-only list of reward tokens.
    Stream(Address),
    Balance(Address),
    Checkpoint(Address, Address), // (account, reward asset)
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

// ---------------------------------------------------------------------------
// Config and roles
// ---------------------------------------------------------------------------

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn get_config(env: &Env) -> Result<Config, ContractError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(ContractError::NotInitialized)
}

pub fn set_config(env: &Env, config: &Config) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

pub fn get_pending_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&DataKey::PendingAdmin)
}

pub fn set_pending_admin(env: &Env, candidate: &Address) {
    env.storage().instance().set(&DataKey::PendingAdmin, candidate);
    bump_instance(env);
}

pub fn clear_pending_admin(env: &Env) {
    env.storage().instance().remove(&DataKey::PendingAdmin);
    bump_instance(env);
}

pub fn is_retired(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Retired)
        .unwrap_or(false)
}

pub fn set_retired(env: &Env) {
    env.storage().instance().set(&DataKey::Retired, &true);
    bump_instance(env);
}

// ---------------------------------------------------------------------------
// Stake ledger
// ---------------------------------------------------------------------------

pub fn total_staked(env: &Env) -> i128 {
    env.storage()
        .instance()
        .get(&DataKey::TotalStaked)
        .unwrap_or(0)
}

pub fn set_total_staked(env: &Env, total: i128) {
    env.storage().instance().set(&DataKey::TotalStaked, &total);
    bump_instance(env);
}

pub fn balance_of(env: &Env, account: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(account.clone()))
        .unwrap_or(0)
}

pub fn set_balance(env: &Env, account: &Address, balance: i128) {
    let key = DataKey::Balance(account.clone());
    if balance == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &balance);
    bump_persistent(env, &key);
}

// ---------------------------------------------------------------------------
// Reward streams
// ---------------------------------------------------------------------------

pub fn reward_assets(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::RewardAssets)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn push_reward_asset(env: &Env, asset: &Address) {
    let mut assets = reward_assets(env);
    assets.push_back(asset.clone());
    env.storage().instance().set(&DataKey::RewardAssets, &assets);
    bump_instance(env);
}

pub fn has_stream(env: &Env, asset: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&DataKey::Stream(asset.clone()))
}

pub fn load_stream(env: &Env, asset: &Address) -> Result<RewardStream, ContractError> {
    env.storage()
        .persistent()
        .get(&DataKey::Stream(asset.clone()))
        .ok_or(ContractError::StreamNotFound)
}

pub fn save_stream(env: &Env, asset: &Address, stream: &RewardStream) {
    let key = DataKey::Stream(asset.clone());
    env.storage().persistent().set(&key, stream);
    bump_persistent(env, &key);
}

// ---------------------------------------------------------------------------
// Per-account checkpoints
// ---------------------------------------------------------------------------

pub fn load_checkpoint(env: &Env, account: &Address, asset: &Address) -> AccountCheckpoint {
    env.storage()
        .persistent()
        .get(&DataKey::Checkpoint(account.clone(), asset.clone()))
        .unwrap_or_default()
}

pub fn save_checkpoint(
    env: &Env,
    account: &Address,
    asset: &Address,
    checkpoint: &AccountCheckpoint,
) {
    let key = DataKey::Checkpoint(account.clone(), asset.clone());
    env.storage().persistent().set(&key, checkpoint);
    bump_persistent(env, &key);
}
