//! Static copy-length policy. Pure function of the copy, no external calls.

use adgen_core::types::{CampaignCopy, ComplianceResult, MAX_CTA_CHARS, MAX_HEADLINE_CHARS};

pub const PASS_SCORE: u8 = 98;
pub const FAIL_SCORE: u8 = 80;

pub fn check_compliance(copy: &CampaignCopy) -> ComplianceResult {
    let headline_len = copy.headline_chars();
    let cta_len = copy.cta_chars();
    let headline_ok = headline_len <= MAX_HEADLINE_CHARS;
    let cta_ok = cta_len <= MAX_CTA_CHARS;
    let passed = headline_ok && cta_ok;

    let report = format!(
        "Headline: {} ({headline_len}/{MAX_HEADLINE_CHARS} chars)\n\
         CTA: {} ({cta_len}/{MAX_CTA_CHARS} chars)",
        verdict(headline_ok),
        verdict(cta_ok),
    );

    ComplianceResult {
        passed,
        score: if passed { PASS_SCORE } else { FAIL_SCORE },
        report,
    }
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "✓ OK"
    } else {
        "✗ Too long"
    }
}
