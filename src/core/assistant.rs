//! Scripted answers for the pension assistant demo.
//!
//! Questions are normalised and looked up in a fixed table; anything else gets
//! a fallback that points the reader at the learning material and calculator.
//! There is no conversation state.

use serde::Serialize;

pub const WELCOME_MESSAGE: &str = "Hello! I'm your NPS Assistant. Ask me anything about the National Pension System: account setup, tax benefits, withdrawals, pension calculations, and more.";

pub const QUICK_ACTIONS: [&str; 5] = [
    "What is NPS?",
    "Tax Benefits",
    "How to Open Account",
    "Calculate My Pension",
    "Withdrawal Rules",
];

const CANNED_REPLIES: [(&str, &str); 4] = [
    (
        "what is nps",
        "**National Pension System (NPS)** is a government-sponsored pension scheme launched in 2004. It is regulated by PFRDA and open to all Indian citizens aged 18-70.\n\n\
**Key highlights:**\n\
- Voluntary, defined-contribution retirement savings scheme\n\
- **Tier I** (mandatory): locked in till 60, tax benefits under 80C & 80CCD\n\
- **Tier II** (optional): flexible withdrawals, no tax benefits\n\
- Minimum contribution: ₹500/month or ₹1,000/year for Tier I\n\
- Choose your own fund manager and asset allocation\n\n\
Would you like to know about tax benefits or how to open an account?",
    ),
    (
        "tax benefits",
        "**NPS tax benefits:**\n\n\
1. **Section 80C**: up to ₹1.5 lakh deduction\n\
2. **Section 80CCD(1B)**: additional ₹50,000 deduction, exclusive to NPS\n\
3. **Section 80CCD(2)**: employer contribution up to 10% of salary (14% for government employers)\n\n\
**Total possible deduction: up to ₹2 lakh** under NPS alone.\n\n\
**At maturity (after 60):**\n\
- 60% of the corpus is tax-free on withdrawal\n\
- 40% must be used to buy an annuity\n\n\
Shall I calculate your tax savings?",
    ),
    (
        "how to open account",
        "**Opening an NPS account online (eNPS):**\n\
1. Visit the eNPS portal and choose \"Registration\" then \"Individual Subscriber\"\n\
2. Enter Aadhaar or PAN details\n\
3. Complete KYC with OTP verification\n\
4. Choose investment preferences\n\
5. Make an initial contribution (minimum ₹500)\n\
6. Receive your **PRAN** (Permanent Retirement Account Number)\n\n\
**Documents needed:** Aadhaar card, PAN card, bank account details, a passport-size photo and address proof.\n\n\
The online process takes about 15 minutes.",
    ),
    (
        "withdrawal rules",
        "**NPS withdrawal rules:**\n\n\
**At 60 (normal exit):**\n\
- Withdraw up to **60% as a lump sum** (tax-free)\n\
- The remaining **40% must buy an annuity** (monthly pension)\n\n\
**Before 60 (premature exit):**\n\
- Allowed after **5 years** of membership\n\
- **80% goes to an annuity**, only **20% as a lump sum**\n\
- The lump sum portion is taxable\n\n\
**Partial withdrawal:**\n\
- Allowed after **3 years** of membership\n\
- Up to **25% of own contributions**, at most **3 times**\n\
- For children's education, marriage, house purchase or medical treatment",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub reply: String,
    pub matched: bool,
}

/// Lookup key for a question: trimmed, lowercased, without `?` or `!`.
pub fn normalize_question(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .filter(|ch| !matches!(ch, '?' | '!'))
        .collect::<String>()
        .trim()
        .to_string()
}

pub fn reply(text: &str) -> AssistantReply {
    let key = normalize_question(text);
    match CANNED_REPLIES.iter().find(|(question, _)| *question == key) {
        Some((_, answer)) => AssistantReply {
            reply: (*answer).to_string(),
            matched: true,
        },
        None => AssistantReply {
            reply: fallback_reply(text),
            matched: false,
        },
    }
}

fn fallback_reply(text: &str) -> String {
    format!(
        "Thank you for your question about \"{}\". I can only answer a fixed set of common questions right now.\n\n\
In the meantime, you can explore the **Learn NPS** section or use the **Pension Calculator** for instant projections!",
        text.trim()
    )
}
