use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer};
use anchor_spl::token::{self, Token, TokenAccount};

use crate::constants::*;
use crate::error::SubnameRegistrarError;
use crate::pricing::{native_to_stable, stable_to_native, PriceQuote, PriceUnit, Pricer, RateSource};
use crate::state::*;

/// Asset and amount the treasury pays a beneficiary with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Payout {
    pub unit: PriceUnit,
    pub amount: u64,
}

/// Pick how `owed` stable units are paid: stable holdings first, then
/// lamports at a freshly read rate.
pub fn plan_payout(
    owed: u64,
    stable_available: u64,
    native_available: u64,
    rates: &dyn RateSource,
) -> Result<Payout> {
    if stable_available >= owed {
        return Ok(Payout {
            unit: PriceUnit::Stable,
            amount: owed,
        });
    }

    let lamports = stable_to_native(owed, &rates.latest_rate()?)?;
    require!(
        native_available >= lamports,
        SubnameRegistrarError::InsufficientTreasury
    );
    Ok(Payout {
        unit: PriceUnit::Native,
        amount: lamports,
    })
}

/// Stable units the treasury can pay out. Without a destination token
/// account the payout has to come from the native vault.
pub fn stable_capacity(treasury_amount: u64, destination_supplied: bool) -> u64 {
    if destination_supplied {
        treasury_amount
    } else {
        0
    }
}

/// Lamports the vault can spend without dropping below rent exemption
pub fn spendable_lamports(vault: &AccountInfo) -> Result<u64> {
    let reserve = Rent::get()?.minimum_balance(0);
    Ok(vault.lamports().saturating_sub(reserve))
}

/// Pays beneficiaries out of the pooled treasury
pub struct TreasuryPayer<'a, 'info> {
    pub program_state: &'a Account<'info, ProgramState>,
    pub native_vault: &'a SystemAccount<'info>,
    pub stable_treasury: &'a Account<'info, TokenAccount>,
    pub beneficiary: &'a AccountInfo<'info>,
    /// Without it the beneficiary is paid from the native vault
    pub beneficiary_stable_account: Option<&'a Account<'info, TokenAccount>>,
    pub token_program: &'a Program<'info, Token>,
    pub system_program: &'a Program<'info, System>,
}

impl TreasuryPayer<'_, '_> {
    /// Pay `owed` stable units to the configured beneficiary
    pub fn pay(&self, config: &DomainConfig, owed: u64, rates: &dyn RateSource) -> Result<Payout> {
        require_keys_eq!(
            self.beneficiary.key(),
            config.beneficiary,
            SubnameRegistrarError::BeneficiaryMismatch
        );
        let payout = plan_payout(
            owed,
            stable_capacity(
                self.stable_treasury.amount,
                self.beneficiary_stable_account.is_some(),
            ),
            spendable_lamports(&self.native_vault.to_account_info())?,
            rates,
        )?;
        if payout.amount == 0 {
            return Ok(payout);
        }

        match payout.unit {
            PriceUnit::Stable => {
                let to = self
                    .beneficiary_stable_account
                    .ok_or(error!(SubnameRegistrarError::MissingAccount))?;
                require_keys_eq!(
                    to.owner,
                    config.beneficiary,
                    SubnameRegistrarError::BeneficiaryMismatch
                );
                let signer_seeds: &[&[&[u8]]] = &[&[PROGRAM_STATE_SEED, &[self.program_state.bump]]];
                token::transfer(
                    CpiContext::new_with_signer(
                        self.token_program.to_account_info(),
                        token::Transfer {
                            from: self.stable_treasury.to_account_info(),
                            to: to.to_account_info(),
                            authority: self.program_state.to_account_info(),
                        },
                        signer_seeds,
                    ),
                    payout.amount,
                )
                .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?;
            }
            PriceUnit::Native => {
                let signer_seeds: &[&[&[u8]]] = &[&[NATIVE_VAULT_SEED, &[self.program_state.vault_bump]]];
                transfer(
                    CpiContext::new_with_signer(
                        self.system_program.to_account_info(),
                        system_program::Transfer {
                            from: self.native_vault.to_account_info(),
                            to: self.beneficiary.clone(),
                        },
                        signer_seeds,
                    ),
                    payout.amount,
                )
                .map_err(|_| error!(SubnameRegistrarError::TransferFailed))?;
            }
        }

        msg!(
            "Treasury paid {} {:?} to beneficiary {}",
            payout.amount,
            payout.unit,
            config.beneficiary
        );
        Ok(payout)
    }
}

/// Stable units credited for a native deposit of `lamports`.
/// An empty deposit credits nothing without reading the oracle.
pub fn native_deposit_credit(lamports: u64, rates: &dyn RateSource) -> Result<u64> {
    if lamports == 0 {
        return Ok(0);
    }
    let credited = native_to_stable(lamports, &rates.latest_rate()?)?;
    require!(credited > 0, SubnameRegistrarError::AmountTooSmall);
    Ok(credited)
}

/// Quote a balance-funded operation, run `validate`, and only then debit the
/// fee. Any failure leaves the ledger untouched.
pub fn charge_balance<T>(
    balance: &mut UserBalance,
    pricer: &Pricer,
    duration: i64,
    rates: &dyn RateSource,
    validate: impl FnOnce() -> Result<T>,
) -> Result<(PriceQuote, T)> {
    require!(
        pricer.default_unit() == PriceUnit::Stable,
        SubnameRegistrarError::PricerNotUSDC
    );
    let quote = pricer.quote_in(duration, None, rates)?;
    let validated = validate()?;
    balance.debit(quote.amount)?;
    Ok((quote, validated))
}

/// Ledger entry of `owner`, initialising a freshly created account
pub fn open_balance(balance: &mut UserBalance, owner: Pubkey, bump: u8) {
    if balance.owner == Pubkey::default() {
        balance.owner = owner;
        balance.bump = bump;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PERIOD_SECONDS;
    use crate::pricing::{FixedPricer, OracleRate, PeriodicPricer};
    use crate::test_utils::{error_code, sol_usd, StaticRate};

    fn funded(amount: u64) -> UserBalance {
        UserBalance {
            owner: Pubkey::new_unique(),
            amount,
            bump: 255,
        }
    }

    fn weekly_stable(price_per_period: u64) -> Pricer {
        Pricer::Periodic(PeriodicPricer {
            default_unit: PriceUnit::Stable,
            price_per_period,
        })
    }

    #[test]
    fn stable_holdings_are_preferred() {
        let payout = plan_payout(1_000_000, 1_000_000, 0, &StaticRate(OracleRate::invalid())).unwrap();
        assert_eq!(
            payout,
            Payout {
                unit: PriceUnit::Stable,
                amount: 1_000_000
            }
        );
    }

    #[test]
    fn falls_back_to_lamports_at_the_oracle_rate() {
        let payout = plan_payout(1_000_000, 999_999, 10_000_000, &StaticRate(sol_usd(100))).unwrap();
        assert_eq!(
            payout,
            Payout {
                unit: PriceUnit::Native,
                amount: 10_000_000
            }
        );
    }

    #[test]
    fn fails_when_neither_asset_covers_the_fee() {
        let err = plan_payout(1_000_000, 0, 9_999_999, &StaticRate(sol_usd(100))).unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::InsufficientTreasury.into())
        );
    }

    #[test]
    fn fallback_fails_closed_on_bad_rate() {
        let err = plan_payout(1_000_000, 0, u64::MAX, &StaticRate(OracleRate::invalid())).unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::InvalidRate.into())
        );
    }

    #[test]
    fn ledger_debit_is_exact_when_payout_switches_asset() {
        let mut balance = UserBalance {
            owner: Pubkey::default(),
            amount: 0,
            bump: 0,
        };
        let owner = Pubkey::new_unique();
        open_balance(&mut balance, owner, 254);
        balance.credit(2_500_000).unwrap();

        let fee = 1_000_000;
        balance.debit(fee).unwrap();
        let payout = plan_payout(fee, 0, 50_000_000, &StaticRate(sol_usd(150))).unwrap();

        assert_eq!(payout.unit, PriceUnit::Native);
        assert_eq!(balance.amount, 1_500_000);
        assert_eq!(balance.owner, owner);
        assert_eq!(balance.bump, 254);
    }

    #[test]
    fn missing_stable_destination_falls_back_to_lamports() {
        let owed = 1_000_000;
        let payout = plan_payout(
            owed,
            stable_capacity(50_000_000, false),
            10_000_000,
            &StaticRate(sol_usd(100)),
        )
        .unwrap();
        assert_eq!(payout.unit, PriceUnit::Native);
        assert_eq!(payout.amount, 10_000_000);
        assert_eq!(stable_capacity(50_000_000, true), 50_000_000);
    }

    #[test]
    fn native_deposit_credit_rejects_dust() {
        let rate = StaticRate(sol_usd(150));
        assert_eq!(
            native_deposit_credit(0, &StaticRate(OracleRate::invalid())).unwrap(),
            0
        );
        assert_eq!(native_deposit_credit(1_000_000_000, &rate).unwrap(), 150_000_000);
        assert_eq!(
            error_code(native_deposit_credit(1, &rate).unwrap_err()),
            error_code(SubnameRegistrarError::AmountTooSmall.into())
        );
        assert_eq!(
            error_code(native_deposit_credit(1_000, &StaticRate(OracleRate::invalid())).unwrap_err()),
            error_code(SubnameRegistrarError::InvalidRate.into())
        );
    }

    #[test]
    fn balance_charge_requires_a_stable_pricer() {
        let mut balance = funded(10_000_000);
        let pricer = Pricer::Fixed(FixedPricer {
            unit: PriceUnit::Native,
            price_per_period: 1,
        });
        let mut validated = false;
        let err = charge_balance(&mut balance, &pricer, PERIOD_SECONDS, &StaticRate(sol_usd(100)), || {
            validated = true;
            Ok(())
        })
        .unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::PricerNotUSDC.into())
        );
        assert!(!validated);
        assert_eq!(balance.amount, 10_000_000);
    }

    #[test]
    fn failed_validation_leaves_the_ledger_untouched() {
        let mut balance = funded(10_000_000);
        let err = charge_balance(
            &mut balance,
            &weekly_stable(1_000_000),
            PERIOD_SECONDS,
            &StaticRate(OracleRate::invalid()),
            || -> Result<()> { err!(SubnameRegistrarError::ParentExpired) },
        )
        .unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::ParentExpired.into())
        );
        assert_eq!(balance.amount, 10_000_000);
    }

    #[test]
    fn balance_charge_debits_the_exact_stable_fee() {
        let mut balance = funded(2_500_000);
        let (quote, expiry) = charge_balance(
            &mut balance,
            &weekly_stable(1_000_000),
            2 * PERIOD_SECONDS,
            &StaticRate(OracleRate::invalid()),
            || Ok(42i64),
        )
        .unwrap();
        assert_eq!(
            quote,
            PriceQuote {
                unit: PriceUnit::Stable,
                amount: 2_000_000
            }
        );
        assert_eq!(expiry, 42);
        assert_eq!(balance.amount, 500_000);

        let err = charge_balance(
            &mut balance,
            &weekly_stable(1_000_000),
            PERIOD_SECONDS,
            &StaticRate(OracleRate::invalid()),
            || Ok(()),
        )
        .unwrap_err();
        assert_eq!(
            error_code(err),
            error_code(SubnameRegistrarError::InsufficientBalance.into())
        );
        assert_eq!(balance.amount, 500_000);
    }
}
