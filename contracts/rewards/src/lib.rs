#![no_std]

mod accrual;
mod checkpoint;
mod storage;

use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, Env, Map, Vec,
};

pub use accrual::PRECISION;

/// Amount sentinel for `withdraw`: take the caller's entire balance.
pub const WITHDRAW_ALL: i128 = i128::MAX;

/// Default wait after the last reward period ends before reward tokens may be
/// swept (90 days).
pub const DEFAULT_SWEEP_COOLDOWN: u64 = 90 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Global configuration for a rewards pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub stake_token: Address,
    pub admin: Address,
    /// Identity allowed to call `withdraw_for`.
    pub wrapper: Option<Address>,
    pub sweep_cooldown: u64,
}

/// Funding and accrual record for one reward token.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardStream {
    pub distributor: Address,
    pub duration: u64,
    pub period_end: u64,
    pub rate: i128,
    pub last_update: u64,
    pub accumulated_per_unit: i128,
}

/// What an account has settled for one reward token.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountCheckpoint {
    pub paid_per_unit: i128,
    pub accrued: i128,
}

#[soroban_sdk::contracterror]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    InvalidAmount = 3,
    InsufficientBalance = 4,
    Unauthorized = 5,
    AlreadyRegistered = 6,
    ZeroIdentity = 7,
    PoolRetired = 8,
    OverAllocated = 9,
    PeriodActive = 10,
    CannotSweepStakeAsset = 11,
    CooldownNotElapsed = 12,
    MustWithdrawAllBeforeExit = 13,
    StreamNotFound = 14,
    StakeAssetNotRewardable = 15,
    ArithmeticOverflow = 16,
    NoPendingAdmin = 17,
    WrapperNotSet = 18,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PoolEvent {
    StreamRegistered(Address),
    DistributorUpdated(Address),
    DurationUpdated(u64),
    WrapperUpdated(Address),
    AdminProposed(Address),
    AdminAccepted(Address),
    Retired(u64),
}

// ---------------------------------------------------------------------------
// Internal Helpers
// ---------------------------------------------------------------------------

impl FluxoraRewards {
    fn require_admin(env: &Env, caller: &Address) -> Result<Config, ContractError> {
        caller.require_auth();
        let config = storage::get_config(env)?;
        if *caller != config.admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(config)
    }

    fn require_distributor(
        env: &Env,
        caller: &Address,
        asset: &Address,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        if *caller != storage::load_stream(env, asset)?.distributor {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn adjust_total(env: &Env, delta: i128) -> Result<(), ContractError> {
        let total = storage::total_staked(env)
            .checked_add(delta)
            .ok_or(ContractError::ArithmeticOverflow)?;
        storage::set_total_staked(env, total);
        Ok(())
    }

    /// Credit `recipient` with `amount` stake units paid for by `payer`.
    fn stake(
        env: &Env,
        payer: &Address,
        recipient: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 || amount == WITHDRAW_ALL {
            return Err(ContractError::InvalidAmount);
        }
        let config = storage::get_config(env)?;
        if storage::is_retired(env) {
            return Err(ContractError::PoolRetired);
        }

        checkpoint::checkpoint(env, Some(recipient))?;

        let balance = storage::balance_of(env, recipient)
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        storage::set_balance(env, recipient, balance);
        Self::adjust_total(env, amount)?;

        token::Client::new(env, &config.stake_token).transfer(
            payer,
            &env.current_contract_address(),
            &amount,
        );

        env.events()
            .publish((symbol_short!("staked"), recipient.clone()), amount);
        Ok(())
    }

    /// Debit `account` and send the stake units to `to`. Returns the amount
    /// actually withdrawn after resolving `WITHDRAW_ALL`.
    fn unstake(
        env: &Env,
        account: &Address,
        requested: i128,
        to: &Address,
        require_full: bool,
    ) -> Result<i128, ContractError> {
        let config = storage::get_config(env)?;

        checkpoint::checkpoint(env, Some(account))?;

        let balance = storage::balance_of(env, account);
        let amount = if requested == WITHDRAW_ALL {
            balance
        } else {
            requested
        };
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount > balance {
            return Err(ContractError::InsufficientBalance);
        }
        if require_full && amount != balance {
            return Err(ContractError::MustWithdrawAllBeforeExit);
        }

        storage::set_balance(env, account, balance - amount);
        Self::adjust_total(env, -amount)?;

        token::Client::new(env, &config.stake_token).transfer(
            &env.current_contract_address(),
            to,
            &amount,
        );

        env.events()
            .publish((symbol_short!("withdrawn"), account.clone()), amount);
        Ok(amount)
    }

    /// Pay out whatever `account` has settled for `asset`. The caller must have
    /// checkpointed the account first.
    fn pay_reward(env: &Env, account: &Address, asset: &Address) -> i128 {
        let mut settled = storage::load_checkpoint(env, account, asset);
        let owed = settled.accrued;
        if owed <= 0 {
            return 0;
        }

        settled.accrued = 0;
        storage::save_checkpoint(env, account, asset, &settled);

        token::Client::new(env, asset).transfer(&env.current_contract_address(), account, &owed);

        env.events().publish(
            (symbol_short!("claimed"), account.clone(), asset.clone()),
            owed,
        );
        owed
    }

    fn pay_all_rewards(env: &Env, account: &Address) -> Map<Address, i128> {
        let mut paid = Map::new(env);
        for asset in storage::reward_assets(env).iter() {
            let amount = Self::pay_reward(env, account, &asset);
            if amount > 0 {
                paid.set(asset, amount);
            }
        }
        paid
    }

    /// Latest `period_end` across every registered stream.
    fn latest_period_end(env: &Env) -> Result<u64, ContractError> {
        let mut latest = 0u64;
        for asset in storage::reward_assets(env).iter() {
            latest = latest.max(storage::load_stream(env, &asset)?.period_end);
        }
        Ok(latest)
    }
}

// ---------------------------------------------------------------------------
// Contract Implementation
// ---------------------------------------------------------------------------

#[contract]
pub struct FluxoraRewards;

#[contractimpl]
impl FluxoraRewards {
    /// Initialise the pool with its stake token, admin and sweep cooldown.
    ///
    /// Must be called exactly once on a freshly deployed instance; every new
    /// pool is a new deployment followed by `init`.
    ///
    /// # Parameters
    /// - `stake_token`: token participants deposit to earn rewards
    /// - `admin`: address allowed to register streams, assign distributors,
    ///   set the wrapper and sweep tokens
    /// - `sweep_cooldown`: seconds after the last reward period ends before a
    ///   reward token may be swept (see `DEFAULT_SWEEP_COOLDOWN`)
    ///
    /// # Errors
    /// - `AlreadyInitialized` if the pool has a config already
    pub fn init(
        env: Env,
        stake_token: Address,
        admin: Address,
        sweep_cooldown: u64,
    ) -> Result<(), ContractError> {
        if storage::has_config(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        storage::set_config(
            &env,
            &Config {
                stake_token,
                admin,
                wrapper: None,
                sweep_cooldown,
            },
        );
        storage::set_total_staked(&env, 0);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Staking
    // -----------------------------------------------------------------------

    /// Stake `amount` units of the stake token on behalf of `account`.
    ///
    /// Settles the account's rewards at the old balance before the balance
    /// changes, then pulls the tokens in.
    ///
    /// # Authorization
    /// - Requires authorization from `account`
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount <= 0` or equals `WITHDRAW_ALL`
    /// - `PoolRetired` once the pool has been retired
    ///
    /// # Events
    /// - `staked(account)` with the amount
    pub fn deposit(env: Env, account: Address, amount: i128) -> Result<(), ContractError> {
        account.require_auth();
        Self::stake(&env, &account, &account, amount)
    }

    /// Stake tokens paid by `payer` into `recipient`'s balance.
    ///
    /// Same rules as `deposit`; only `payer` authorizes. The rewards accrue to
    /// `recipient`.
    pub fn deposit_for(
        env: Env,
        payer: Address,
        recipient: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        payer.require_auth();
        Self::stake(&env, &payer, &recipient, amount)
    }

    /// Withdraw staked tokens back to `account`.
    ///
    /// Pass `WITHDRAW_ALL` to withdraw the whole balance. Withdrawals keep
    /// working after the pool is retired.
    ///
    /// # Returns
    /// - The amount transferred
    ///
    /// # Errors
    /// - `InvalidAmount` if the resolved amount is not positive
    /// - `InsufficientBalance` if `amount` exceeds the staked balance
    pub fn withdraw(env: Env, account: Address, amount: i128) -> Result<i128, ContractError> {
        account.require_auth();
        Self::unstake(&env, &account, amount, &account, false)
    }

    /// Withdraw on behalf of `recipient`, callable only by the configured
    /// wrapper.
    ///
    /// The stake tokens go to the wrapper, which finishes the conversion back
    /// to the underlying asset. With `also_exit` the whole balance must be
    /// withdrawn and the recipient's rewards are paid to the recipient.
    ///
    /// # Errors
    /// - `WrapperNotSet` if no wrapper has been configured
    /// - `MustWithdrawAllBeforeExit` if `also_exit` and `amount` is not the
    ///   full balance
    /// - plus the errors of `withdraw`
    pub fn withdraw_for(
        env: Env,
        recipient: Address,
        amount: i128,
        also_exit: bool,
    ) -> Result<i128, ContractError> {
        let wrapper = storage::get_config(&env)?
            .wrapper
            .ok_or(ContractError::WrapperNotSet)?;
        wrapper.require_auth();

        let withdrawn = Self::unstake(&env, &recipient, amount, &wrapper, also_exit)?;
        if also_exit {
            Self::pay_all_rewards(&env, &recipient);
        }
        Ok(withdrawn)
    }

    // -----------------------------------------------------------------------
    // Claiming
    // -----------------------------------------------------------------------

    /// Claim every reward token owed to `account`.
    ///
    /// Returns the amounts paid keyed by reward token; tokens with nothing
    /// owed are left out. Claiming with nothing owed succeeds and transfers
    /// nothing.
    pub fn claim(env: Env, account: Address) -> Result<Map<Address, i128>, ContractError> {
        account.require_auth();
        checkpoint::checkpoint(&env, Some(&account))?;
        Ok(Self::pay_all_rewards(&env, &account))
    }

    /// Claim a single reward token. Returns the amount paid (0 if nothing owed).
    ///
    /// # Errors
    /// - `StreamNotFound` if `asset` is not a registered reward token
    pub fn claim_one(env: Env, account: Address, asset: Address) -> Result<i128, ContractError> {
        account.require_auth();
        if !storage::has_stream(&env, &asset) {
            return Err(ContractError::StreamNotFound);
        }
        checkpoint::checkpoint(&env, Some(&account))?;
        Ok(Self::pay_reward(&env, &account, &asset))
    }

    /// Withdraw the full balance and claim every reward token.
    ///
    /// # Returns
    /// - The stake amount withdrawn
    ///
    /// # Errors
    /// - `InvalidAmount` if the account has nothing staked
    pub fn exit(env: Env, account: Address) -> Result<i128, ContractError> {
        account.require_auth();
        let withdrawn = Self::unstake(&env, &account, WITHDRAW_ALL, &account, false)?;
        Self::pay_all_rewards(&env, &account);
        Ok(withdrawn)
    }

    // -----------------------------------------------------------------------
    // Reward streams
    // -----------------------------------------------------------------------

    /// Register `asset` as a reward token funded by `distributor` in periods
    /// of `duration` seconds.
    ///
    /// The reward list is append-only: a stream can never be removed, since
    /// settled checkpoints reference its cumulative figure.
    ///
    /// # Authorization
    /// - Admin only
    ///
    /// # Errors
    /// - `InvalidAmount` if `duration == 0`
    /// - `ZeroIdentity` if `asset` or `distributor` is this contract
    /// - `StakeAssetNotRewardable` if `asset` is the stake token
    /// - `AlreadyRegistered` if `asset` already has a stream
    /// - `PoolRetired` once the pool has been retired
    pub fn register_stream(
        env: Env,
        admin: Address,
        asset: Address,
        distributor: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        let config = Self::require_admin(&env, &admin)?;
        if storage::is_retired(&env) {
            return Err(ContractError::PoolRetired);
        }

        let this = env.current_contract_address();
        if asset == this || distributor == this {
            return Err(ContractError::ZeroIdentity);
        }
        if asset == config.stake_token {
            return Err(ContractError::StakeAssetNotRewardable);
        }
        if duration == 0 {
            return Err(ContractError::InvalidAmount);
        }
        if storage::has_stream(&env, &asset) {
            return Err(ContractError::AlreadyRegistered);
        }

        checkpoint::checkpoint(&env, None)?;

        storage::save_stream(
            &env,
            &asset,
            &RewardStream {
                distributor,
                duration,
                period_end: 0,
                rate: 0,
                last_update: 0,
                accumulated_per_unit: 0,
            },
        );
        storage::push_reward_asset(&env, &asset);

        env.events().publish(
            (symbol_short!("stream"), asset.clone()),
            PoolEvent::StreamRegistered(asset),
        );
        Ok(())
    }

    /// Fund a reward stream and restart its period at the current time.
    ///
    /// Pulls `amount` of `asset` from the distributor. If the running period
    /// has not ended yet, its undistributed tail is rolled into the new rate:
    ///
    /// - period over: `rate = amount / duration`
    /// - mid-period: `rate = (amount + (period_end - now) × rate) / duration`
    ///
    /// The new rate must be payable for a whole period out of the tokens the
    /// contract holds after the transfer. Division floors; the remainder
    /// stays in the contract and is only recoverable through `sweep` after
    /// retirement.
    ///
    /// # Authorization
    /// - The stream's distributor only
    ///
    /// # Errors
    /// - `StreamNotFound`, `Unauthorized`
    /// - `InvalidAmount` if `amount <= 0`
    /// - `OverAllocated` if `rate > balance / duration`
    /// - `PoolRetired` once the pool has been retired
    ///
    /// # Events
    /// - `funded(asset)` with the amount
    pub fn fund(
        env: Env,
        distributor: Address,
        asset: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_distributor(&env, &distributor, &asset)?;
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if storage::is_retired(&env) {
            return Err(ContractError::PoolRetired);
        }

        checkpoint::checkpoint(&env, None)?;

        let this = env.current_contract_address();
        let reward_token = token::Client::new(&env, &asset);
        reward_token.transfer(&distributor, &this, &amount);

        let now = env.ledger().timestamp();
        let mut stream = storage::load_stream(&env, &asset)?;
        let rate = accrual::funded_rate(&stream, amount, now)?;
        if !accrual::covered_by_balance(rate, reward_token.balance(&this), stream.duration) {
            return Err(ContractError::OverAllocated);
        }

        stream.rate = rate;
        stream.last_update = now;
        stream.period_end = now
            .checked_add(stream.duration)
            .ok_or(ContractError::ArithmeticOverflow)?;
        storage::save_stream(&env, &asset, &stream);

        log!(&env, "stream funded", asset, rate, stream.period_end);
        env.events()
            .publish((symbol_short!("funded"), asset), amount);
        Ok(())
    }

    /// Hand the funding role of a stream to another address. Admin only.
    pub fn set_distributor(
        env: Env,
        admin: Address,
        asset: Address,
        distributor: Address,
    ) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        if !storage::has_stream(&env, &asset) {
            return Err(ContractError::StreamNotFound);
        }
        if distributor == env.current_contract_address() {
            return Err(ContractError::ZeroIdentity);
        }

        checkpoint::checkpoint(&env, None)?;

        let mut stream = storage::load_stream(&env, &asset)?;
        stream.distributor = distributor.clone();
        storage::save_stream(&env, &asset, &stream);

        env.events().publish(
            (symbol_short!("distrib"), asset),
            PoolEvent::DistributorUpdated(distributor),
        );
        Ok(())
    }

    /// Change the period length of a stream.
    ///
    /// Only allowed once the current period has fully elapsed, so the rate of
    /// a running period never changes underneath stakers.
    ///
    /// # Authorization
    /// - The stream's distributor only
    ///
    /// # Errors
    /// - `PeriodActive` if `now <= period_end`
    /// - `InvalidAmount` if `duration == 0`
    pub fn set_duration(
        env: Env,
        distributor: Address,
        asset: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_distributor(&env, &distributor, &asset)?;
        if duration == 0 {
            return Err(ContractError::InvalidAmount);
        }

        checkpoint::checkpoint(&env, None)?;

        let mut stream = storage::load_stream(&env, &asset)?;
        if env.ledger().timestamp() <= stream.period_end {
            return Err(ContractError::PeriodActive);
        }
        stream.duration = duration;
        storage::save_stream(&env, &asset, &stream);

        env.events().publish(
            (symbol_short!("duration"), asset),
            PoolEvent::DurationUpdated(duration),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------------

    /// Set the address allowed to call `withdraw_for`. Admin only.
    pub fn set_wrapper(env: Env, admin: Address, wrapper: Address) -> Result<(), ContractError> {
        let mut config = Self::require_admin(&env, &admin)?;
        config.wrapper = Some(wrapper.clone());
        storage::set_config(&env, &config);

        env.events().publish(
            (symbol_short!("wrapper"), symbol_short!("updated")),
            PoolEvent::WrapperUpdated(wrapper),
        );
        Ok(())
    }

    /// First step of an admin handover: record `candidate` as pending admin.
    /// The current admin keeps every privilege until `accept_admin`.
    pub fn propose_admin(env: Env, admin: Address, candidate: Address) -> Result<(), ContractError> {
        Self::require_admin(&env, &admin)?;
        storage::set_pending_admin(&env, &candidate);

        env.events().publish(
            (symbol_short!("admin"), symbol_short!("proposed")),
            PoolEvent::AdminProposed(candidate),
        );
        Ok(())
    }

    /// Second step of an admin handover, signed by the pending admin.
    ///
    /// # Errors
    /// - `NoPendingAdmin` if no handover was proposed
    /// - `Unauthorized` if `candidate` is not the pending admin
    pub fn accept_admin(env: Env, candidate: Address) -> Result<(), ContractError> {
        candidate.require_auth();
        let pending = storage::get_pending_admin(&env).ok_or(ContractError::NoPendingAdmin)?;
        if pending != candidate {
            return Err(ContractError::Unauthorized);
        }

        let mut config = storage::get_config(&env)?;
        config.admin = candidate.clone();
        storage::set_config(&env, &config);
        storage::clear_pending_admin(&env);

        env.events().publish(
            (symbol_short!("admin"), symbol_short!("accepted")),
            PoolEvent::AdminAccepted(candidate),
        );
        Ok(())
    }

    /// Move tokens out of the pool to the admin.
    ///
    /// # Behaviour by asset
    ///
    /// | Asset               | Effect                                                  |
    /// |---------------------|---------------------------------------------------------|
    /// | stake token         | rejected with `CannotSweepStakeAsset`                   |
    /// | registered reward   | after cooldown: whole balance swept, pool retired       |
    /// | anything else       | exactly `amount` swept, no side effect                  |
    ///
    /// A reward token can only be swept once `now` is past the latest
    /// `period_end` of every stream plus the configured cooldown. Sweeping it
    /// retires the whole pool: no stream accrues again, deposits and funding
    /// are rejected, and `earned` reports 0 for everyone. Staked balances stay
    /// withdrawable.
    ///
    /// # Returns
    /// - The amount transferred to the admin
    ///
    /// # Errors
    /// - `CannotSweepStakeAsset`, `CooldownNotElapsed`
    /// - `InvalidAmount` if sweeping a foreign token with `amount <= 0`
    pub fn sweep(
        env: Env,
        admin: Address,
        asset: Address,
        amount: i128,
    ) -> Result<i128, ContractError> {
        let config = Self::require_admin(&env, &admin)?;
        if asset == config.stake_token {
            return Err(ContractError::CannotSweepStakeAsset);
        }

        checkpoint::checkpoint(&env, None)?;

        let this = env.current_contract_address();
        let token_client = token::Client::new(&env, &asset);
        let now = env.ledger().timestamp();

        let swept = if storage::has_stream(&env, &asset) {
            let unlocks_at = Self::latest_period_end(&env)?.saturating_add(config.sweep_cooldown);
            if now <= unlocks_at {
                return Err(ContractError::CooldownNotElapsed);
            }
            if !storage::is_retired(&env) {
                storage::set_retired(&env);
                log!(&env, "pool retired", now);
                env.events().publish(
                    (symbol_short!("retired"), asset.clone()),
                    PoolEvent::Retired(now),
                );
            }
            token_client.balance(&this)
        } else {
            if amount <= 0 {
                return Err(ContractError::InvalidAmount);
            }
            amount
        };

        if swept > 0 {
            token_client.transfer(&this, &admin, &swept);
        }

        env.events().publish((symbol_short!("swept"), asset), swept);
        Ok(swept)
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn get_config(env: Env) -> Result<Config, ContractError> {
        storage::get_config(&env)
    }

    pub fn pending_admin(env: Env) -> Option<Address> {
        storage::get_pending_admin(&env)
    }

    pub fn is_retired(env: Env) -> bool {
        storage::is_retired(&env)
    }

    pub fn total_staked(env: Env) -> i128 {
        storage::total_staked(&env)
    }

    pub fn balance_of(env: Env, account: Address) -> i128 {
        storage::balance_of(&env, &account)
    }

    /// Registered reward tokens, in registration order.
    pub fn reward_assets(env: Env) -> Vec<Address> {
        storage::reward_assets(&env)
    }

    /// Stored stream record (as of its last checkpoint).
    pub fn get_stream(env: Env, asset: Address) -> Result<RewardStream, ContractError> {
        storage::load_stream(&env, &asset)
    }

    /// `min(now, period_end)` for the stream.
    pub fn last_time_reward_applicable(env: Env, asset: Address) -> Result<u64, ContractError> {
        let stream = storage::load_stream(&env, &asset)?;
        Ok(accrual::active_until(
            stream.period_end,
            env.ledger().timestamp(),
        ))
    }

    /// Cumulative reward per staked unit as of now, scaled by `PRECISION`.
    pub fn reward_per_unit(env: Env, asset: Address) -> Result<i128, ContractError> {
        let stream = storage::load_stream(&env, &asset)?;
        accrual::reward_per_unit(
            &env,
            &stream,
            storage::total_staked(&env),
            storage::is_retired(&env),
            env.ledger().timestamp(),
        )
    }

    /// Reward claimable by `account` for `asset` right now.
    ///
    /// Always 0 once the pool is retired, including amounts settled before
    /// retirement (see `settled_rewards`).
    pub fn earned(env: Env, account: Address, asset: Address) -> Result<i128, ContractError> {
        checkpoint::pending(&env, &account, &asset)
    }

    /// `earned` for every registered reward token.
    pub fn earned_all(env: Env, account: Address) -> Result<Map<Address, i128>, ContractError> {
        let mut owed = Map::new(&env);
        for asset in storage::reward_assets(&env).iter() {
            let amount = checkpoint::pending(&env, &account, &asset)?;
            owed.set(asset, amount);
        }
        Ok(owed)
    }

    /// Raw checkpoint stored for `account` and `asset`, as of the account's
    /// last interaction.
    pub fn settled_rewards(env: Env, account: Address, asset: Address) -> AccountCheckpoint {
        storage::load_checkpoint(&env, &account, &asset)
    }

    /// Total emission of one full period at the current rate (`rate × duration`).
    pub fn reward_rate_window(env: Env, asset: Address) -> Result<i128, ContractError> {
        accrual::reward_window(&storage::load_stream(&env, &asset)?)
    }
}
