//! Token identities and the catalog used to resolve user input.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// A token as known to the price sources.
///
/// `symbol` is the ledger key and is what symbol-based sources (CryptoCompare,
/// LiveCoinWatch) expect. `id` is the slug used by id-based sources
/// (CoinGecko, CoinCap).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub name: String,
    pub symbol: String,
    pub id: String,
}

impl Token {
    pub fn new(name: &str, symbol: &str, id: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_uppercase(),
            id: id.to_lowercase(),
        }
    }

    fn matches(&self, query: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(query)
            || self.name.eq_ignore_ascii_case(query)
            || self.id.eq_ignore_ascii_case(query)
    }
}

// (name, symbol, price-API id)
const BUILTIN_TOKENS: &[(&str, &str, &str)] = &[
    ("Bitcoin", "BTC", "bitcoin"),
    ("Ethereum", "ETH", "ethereum"),
    ("Solana", "SOL", "solana"),
    ("BONK", "BONK", "bonk"),
    ("Dogecoin", "DOGE", "dogecoin"),
    ("Shiba Inu", "SHIB", "shiba-inu"),
    ("Floki Inu", "FLOKI", "floki-inu"),
    ("Baby Doge", "BABYDOGE", "baby-doge-coin"),
    ("Kishu Inu", "KISHU", "kishu-inu"),
    ("Saitama", "SAITAMA", "saitama"),
    ("SafeMoon", "SAFEMOON", "safemoon"),
    ("EverGrow Coin", "EGC", "evergrow-coin"),
    ("Akita Inu", "AKITA", "akita-inu"),
    ("Volt Inu", "VOLT", "volt-inu"),
    ("CateCoin", "CATE", "catecoin"),
    ("Shiba Predator", "QOM", "shiba-predator"),
    ("DogeBonk", "DOBO", "dogebonk"),
    ("Flokinomics", "FLOKIN", "flokinomics"),
    ("StarLink", "STARL", "starlink"),
    ("Elon Musk Coin", "EMC", "elon-musk-coin"),
    ("DogeGF", "DOGEGF", "dogegf"),
    ("Ryoshi Vision", "RYOSHI", "ryoshi-vision"),
    ("Shibaverse", "VERSE", "shibaverse"),
    ("FEG Token", "FEG", "feg-token"),
    ("Dogelon Mars", "ELON", "dogelon-mars"),
    ("BabyFloki", "BABYFLOKI", "babyfloki"),
    ("PolyDoge", "POLYDOGE", "polydoge"),
    ("TAMA", "TAMA", "tamadoge"),
    ("SpookyShiba", "SPKY", "spookyshiba"),
    ("Moonriver", "MOVR", "moonriver"),
    ("MetaHero", "HERO", "metahero"),
    ("BabyDogeZilla", "BABYDOGEZILLA", "babydogezilla"),
    ("NanoDogeCoin", "NANODOGE", "nanodogecoin"),
    ("BabyShark", "SHARK", "babyshark"),
    ("Wakanda Inu", "WKD", "wakanda-inu"),
    ("King Shiba", "KINGSHIB", "king-shiba"),
    ("PepeCoin", "PEPECOIN", "pepecoin"),
    ("Pitbull", "PIT", "pitbull"),
    ("MoonDoge", "MOONDOGE", "moondoge"),
    ("CryptoZilla", "CZILLA", "cryptozilla"),
    ("MiniDoge", "MINIDOGE", "minidoge"),
    ("ZillaDoge", "ZILLADOGE", "zilladoge"),
    ("DogeFloki", "DOFI", "dogefloki"),
    ("Bonfida", "FIDA", "bonfida"),
];

/// Ordered set of known tokens. Later registrations replace earlier ones
/// with the same symbol.
#[derive(Debug, Clone)]
pub struct TokenCatalog {
    tokens: Vec<Token>,
}

impl TokenCatalog {
    pub fn builtin() -> Self {
        Self {
            tokens: BUILTIN_TOKENS
                .iter()
                .map(|(name, symbol, id)| Token::new(name, symbol, id))
                .collect(),
        }
    }

    /// Built-in catalog extended (or overridden) by user supplied tokens.
    pub fn with_extra(extra: &[Token]) -> Self {
        let mut catalog = Self::builtin();
        for token in extra {
            catalog.register(Token::new(&token.name, &token.symbol, &token.id));
        }
        catalog
    }

    pub fn register(&mut self, token: Token) {
        match self
            .tokens
            .iter_mut()
            .find(|t| t.symbol.eq_ignore_ascii_case(&token.symbol))
        {
            Some(existing) => *existing = token,
            None => self.tokens.push(token),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Resolves a symbol, display name or id.
    ///
    /// Plain alphanumeric input that is not in the catalog becomes an ad-hoc
    /// token so that any listed ticker can still be priced.
    pub fn resolve(&self, query: &str) -> Result<Token> {
        let query = query.trim();
        if query.is_empty() {
            return Err(anyhow!("Token must not be empty"));
        }

        if let Some(token) = self.tokens.iter().find(|t| t.matches(query)) {
            return Ok(token.clone());
        }

        if query.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Ok(Token::new(query, query, query));
        }

        Err(anyhow!("Unknown token: {}", query))
    }
}

impl Default for TokenCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
