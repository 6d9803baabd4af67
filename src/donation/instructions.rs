// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Manual payment instructions shown when the gateway is unavailable.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where a donor can send money without the online gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ManualInstructions {
    pub bank_name: String,
    pub bank_account: String,
    pub account_holder: String,
    /// MTN Mobile Money number.
    pub mtn_mobile_money: String,
    pub orange_money: String,
}

impl Default for ManualInstructions {
    fn default() -> Self {
        Self {
            bank_name: "Afriland First Bank".to_string(),
            bank_account: "10005 00001 00000000000 00".to_string(),
            account_holder: "Church Offerings Account".to_string(),
            mtn_mobile_money: "+237 6 70 00 00 00".to_string(),
            orange_money: "+237 6 90 00 00 00".to_string(),
        }
    }
}

impl ManualInstructions {
    /// Instructions followed by the reference the donor should quote.
    pub fn render(&self, reference: &str) -> String {
        format!(
            "Bank transfer: {} ({}), account holder {}.\n\
             MTN Mobile Money: {}.\n\
             Orange Money: {}.\n\
             Please quote reference {} with your payment.",
            self.bank_name,
            self.bank_account,
            self.account_holder,
            self.mtn_mobile_money,
            self.orange_money,
            reference
        )
    }
}
