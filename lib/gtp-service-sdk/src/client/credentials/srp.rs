//! SRP-6a client computations for the Cognito `USER_SRP_AUTH` flow.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use num_bigint::BigUint;
use rand::RngCore;
use sha2::{Digest, Sha256};

use super::CredentialError;

type HmacSha256 = Hmac<Sha256>;

/// RFC 3526 3072-bit MODP group prime.
const N_HEX: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD1",
    "29024E088A67CC74020BBEA63B139B22514A08798E3404DD",
    "EF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245",
    "E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3D",
    "C2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F",
    "83655D23DCA3AD961C62F356208552BB9ED529077096966D",
    "670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9",
    "DE2BCBF6955817183995497CEA956AE515D2261898FA0510",
    "15728E5A8AAAC42DAD33170D04507A33A85521ABDF1CBA64",
    "ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6B",
    "F12FFA06D98A0864D87602733EC86A64521F2B18177B200C",
    "BBE117577A615D6C770988C0BAD946E208E24FA074E5AB31",
    "43DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);

const GENERATOR: u8 = 2;

const DERIVED_KEY_INFO: &[u8] = b"Caldera Derived Key";

const PRIVATE_KEY_BYTES: usize = 128;

const DERIVED_KEY_LENGTH: usize = 16;

/// Timestamp layout expected by Cognito, e.g. `Tue Mar 4 09:05:07 UTC 2025`.
const TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S UTC %Y";

/// The group parameters `N`, `g` and the multiplier `k = H(N || g)`.
#[derive(Debug, Clone)]
struct SrpGroup {
    n: BigUint,
    g: BigUint,
    k: BigUint,
}

impl SrpGroup {
    fn new() -> Result<Self, CredentialError> {
        let n = parse_hex(N_HEX)?;
        let g = BigUint::from(GENERATOR);
        let k = parse_hex(&hash_hex(&format!("{}{}", pad_big(&n), pad_big(&g)))?)?;
        Ok(Self { n, g, k })
    }
}

/// Values sent back in the `PASSWORD_VERIFIER` challenge response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PasswordClaim {
    pub secret_block: String,
    pub signature: String,
    pub timestamp: String,
}

/// Client side of one SRP exchange.
///
/// Holds the ephemeral private value `a` and the public value `A = g^a mod N`.
#[derive(Debug)]
pub(crate) struct SrpClient {
    group: SrpGroup,
    small_a: BigUint,
    large_a: BigUint,
}

impl SrpClient {
    /// Starts an exchange with a fresh random private value.
    pub fn new() -> Result<Self, CredentialError> {
        let mut bytes = [0_u8; PRIVATE_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::with_private_value(BigUint::from_bytes_be(&bytes))
    }

    fn with_private_value(value: BigUint) -> Result<Self, CredentialError> {
        let group = SrpGroup::new()?;
        let small_a = value % &group.n;
        let large_a = group.g.modpow(&small_a, &group.n);
        if large_a == BigUint::ZERO {
            return Err(CredentialError::Configuration {
                reason: "SRP public value A cannot be zero".to_string(),
            });
        }

        Ok(Self {
            group,
            small_a,
            large_a,
        })
    }

    /// Returns `A` as the hexadecimal `SRP_A` authentication parameter.
    pub fn public_value_hex(&self) -> String {
        self.large_a.to_str_radix(16)
    }

    /// Derives the 16-byte password authentication key.
    ///
    /// `pool_name` is the part of the user pool id after the region.
    pub fn password_authentication_key(
        &self,
        pool_name: &str,
        user_id: &str,
        password: &str,
        server_b_hex: &str,
        salt_hex: &str,
    ) -> Result<Vec<u8>, CredentialError> {
        let SrpGroup { n, g, k } = &self.group;

        let server_b = parse_hex(server_b_hex)?;
        if (&server_b % n) == BigUint::ZERO {
            return Err(CredentialError::InvalidResponse {
                reason: "SRP_B cannot be zero modulo N".to_string(),
            });
        }

        let u = compute_u(&self.large_a, &server_b)?;
        if u == BigUint::ZERO {
            return Err(CredentialError::InvalidResponse {
                reason: "SRP scrambling parameter u cannot be zero".to_string(),
            });
        }

        let x = compute_x(pool_name, user_id, password, salt_hex)?;
        let kgx = (k * g.modpow(&x, n)) % n;
        let base = ((&server_b % n) + n - kgx) % n;
        let exponent = &self.small_a + &u * &x;
        let s = base.modpow(&exponent, n);

        compute_hkdf(&decode_hex(&pad_big(&s))?, &decode_hex(&pad_big(&u))?)
    }

    /// Computes the claim for a `PASSWORD_VERIFIER` challenge.
    #[allow(clippy::too_many_arguments)]
    pub fn password_claim(
        &self,
        pool_name: &str,
        user_id: &str,
        password: &str,
        server_b_hex: &str,
        salt_hex: &str,
        secret_block: &str,
        now: DateTime<Utc>,
    ) -> Result<PasswordClaim, CredentialError> {
        let key =
            self.password_authentication_key(pool_name, user_id, password, server_b_hex, salt_hex)?;
        let timestamp = format_timestamp(now);
        let secret_block_bytes =
            STANDARD
                .decode(secret_block)
                .map_err(|err| CredentialError::InvalidResponse {
                    reason: format!("SECRET_BLOCK is not valid base64: {err}"),
                })?;

        let mut mac = hmac_sha256(&key)?;
        mac.update(pool_name.as_bytes());
        mac.update(user_id.as_bytes());
        mac.update(&secret_block_bytes);
        mac.update(timestamp.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(PasswordClaim {
            secret_block: secret_block.to_string(),
            signature,
            timestamp,
        })
    }
}

/// Formats a timestamp the way Cognito expects it, without a padded day.
pub(crate) fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Left-pads a hexadecimal string so it decodes to a positive big-endian value.
fn pad_hex(hex_value: &str) -> String {
    if hex_value.len() % 2 == 1 {
        format!("0{hex_value}")
    } else if hex_value.starts_with(|ch: char| "89abcdefABCDEF".contains(ch)) {
        format!("00{hex_value}")
    } else {
        hex_value.to_string()
    }
}

fn pad_big(value: &BigUint) -> String {
    pad_hex(&value.to_str_radix(16))
}

fn parse_hex(hex_value: &str) -> Result<BigUint, CredentialError> {
    BigUint::parse_bytes(hex_value.as_bytes(), 16).ok_or_else(|| {
        CredentialError::InvalidResponse {
            reason: format!("'{hex_value}' is not a hexadecimal number"),
        }
    })
}

fn decode_hex(hex_value: &str) -> Result<Vec<u8>, CredentialError> {
    hex::decode(hex_value).map_err(|err| CredentialError::InvalidResponse {
        reason: format!("invalid hexadecimal value: {err}"),
    })
}

/// SHA-256 of the bytes encoded by `hex_value`, as hex.
fn hash_hex(hex_value: &str) -> Result<String, CredentialError> {
    let bytes = decode_hex(hex_value)?;
    Ok(hex::encode(Sha256::digest(bytes)))
}

fn hmac_sha256(key: &[u8]) -> Result<HmacSha256, CredentialError> {
    <HmacSha256 as Mac>::new_from_slice(key).map_err(|err| CredentialError::Configuration {
        reason: format!("invalid HMAC key: {err}"),
    })
}

fn compute_u(large_a: &BigUint, server_b: &BigUint) -> Result<BigUint, CredentialError> {
    parse_hex(&hash_hex(&format!(
        "{}{}",
        pad_big(large_a),
        pad_big(server_b)
    ))?)
}

fn compute_x(
    pool_name: &str,
    user_id: &str,
    password: &str,
    salt_hex: &str,
) -> Result<BigUint, CredentialError> {
    let identity = hex::encode(Sha256::digest(
        format!("{pool_name}{user_id}:{password}").as_bytes(),
    ));
    parse_hex(&hash_hex(&format!("{}{identity}", pad_hex(salt_hex)))?)
}

/// HKDF-SHA256 with a single expand block, truncated to 16 bytes.
fn compute_hkdf(ikm: &[u8], salt: &[u8]) -> Result<Vec<u8>, CredentialError> {
    let mut extract = hmac_sha256(salt)?;
    extract.update(ikm);
    let prk = extract.finalize().into_bytes();

    let mut expand = hmac_sha256(&prk)?;
    expand.update(DERIVED_KEY_INFO);
    expand.update(&[1]);
    let okm = expand.finalize().into_bytes();

    Ok(okm.iter().take(DERIVED_KEY_LENGTH).copied().collect())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    const POOL_NAME: &str = "AbCdEf123";
    const USER_ID: &str = "5f0c6b1e-user";
    const PASSWORD: &str = "correct horse battery staple";
    const SALT: &str = "8d3a0f17c2b6";

    #[rstest]
    #[case::odd_length("abc", "0abc")]
    #[case::high_bit("8f", "008f")]
    #[case::high_bit_upper("F0", "00F0")]
    #[case::low_bit("7f", "7f")]
    #[case::single_digit("2", "02")]
    fn should_pad_hex(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(pad_hex(input), expected);
    }

    #[rstest]
    #[case::single_digit_day(
        Utc.with_ymd_and_hms(2025, 3, 4, 9, 5, 7),
        "Tue Mar 4 09:05:07 UTC 2025"
    )]
    #[case::two_digit_day(
        Utc.with_ymd_and_hms(2024, 12, 25, 23, 59, 0),
        "Wed Dec 25 23:59:00 UTC 2024"
    )]
    fn should_format_timestamp(
        #[case] now: chrono::LocalResult<DateTime<Utc>>,
        #[case] expected: &str,
    ) {
        let now = now.single().expect("unambiguous timestamp");
        assert_eq!(format_timestamp(now), expected);
    }

    #[test]
    fn should_compute_multiplier() {
        let group = SrpGroup::new().expect("group");
        let expected = parse_hex(&hash_hex(&format!("00{N_HEX}02")).expect("hash")).expect("k");

        assert_eq!(group.g, BigUint::from(2_u8));
        assert_eq!(group.k, expected);
    }

    /// Server side of the exchange, following RFC 5054.
    fn server_public_and_key(client: &SrpClient, small_b: &BigUint) -> (String, Vec<u8>) {
        let SrpGroup { n, g, k } = &client.group;
        let x = compute_x(POOL_NAME, USER_ID, PASSWORD, SALT).expect("x");
        let verifier = g.modpow(&x, n);
        let large_b = ((k * &verifier) + g.modpow(small_b, n)) % n;

        let u = compute_u(&client.large_a, &large_b).expect("u");
        let s = ((&client.large_a * verifier.modpow(&u, n)) % n).modpow(small_b, n);
        let key = compute_hkdf(
            &decode_hex(&pad_big(&s)).expect("S bytes"),
            &decode_hex(&pad_big(&u)).expect("u bytes"),
        )
        .expect("server key");

        (large_b.to_str_radix(16), key)
    }

    #[test]
    fn should_agree_on_key_with_server() {
        let client = SrpClient::with_private_value(BigUint::from(0x1234_5678_9abc_def0_u64))
            .expect("client");
        let (server_b_hex, server_key) =
            server_public_and_key(&client, &BigUint::from(0x0fed_cba9_8765_4321_u64));

        let client_key = client
            .password_authentication_key(POOL_NAME, USER_ID, PASSWORD, &server_b_hex, SALT)
            .expect("client key");

        assert_eq!(client_key.len(), DERIVED_KEY_LENGTH);
        assert_eq!(client_key, server_key);
    }

    #[test]
    fn should_not_agree_with_wrong_password() {
        let client = SrpClient::new().expect("client");
        let (server_b_hex, server_key) =
            server_public_and_key(&client, &BigUint::from(424_242_u32));

        let client_key = client
            .password_authentication_key(POOL_NAME, USER_ID, "wrong", &server_b_hex, SALT)
            .expect("client key");

        assert_ne!(client_key, server_key);
    }

    #[test]
    fn should_reject_zero_server_value() {
        let client = SrpClient::new().expect("client");

        let error = client
            .password_authentication_key(POOL_NAME, USER_ID, PASSWORD, N_HEX, SALT)
            .expect_err("B = N should be rejected");

        assert!(matches!(error, CredentialError::InvalidResponse { .. }));
    }

    #[test]
    fn should_sign_password_claim() {
        let client = SrpClient::with_private_value(BigUint::from(7_u8)).expect("client");
        let (server_b_hex, key) = server_public_and_key(&client, &BigUint::from(11_u8));
        let secret_block = STANDARD.encode(b"opaque secret block");
        let now = Utc
            .with_ymd_and_hms(2025, 3, 4, 9, 5, 7)
            .single()
            .expect("timestamp");

        let claim = client
            .password_claim(
                POOL_NAME,
                USER_ID,
                PASSWORD,
                &server_b_hex,
                SALT,
                &secret_block,
                now,
            )
            .expect("claim");

        let mut mac = hmac_sha256(&key).expect("mac");
        mac.update(POOL_NAME.as_bytes());
        mac.update(USER_ID.as_bytes());
        mac.update(b"opaque secret block");
        mac.update(b"Tue Mar 4 09:05:07 UTC 2025");
        let expected = STANDARD.encode(mac.finalize().into_bytes());

        assert_eq!(claim.timestamp, "Tue Mar 4 09:05:07 UTC 2025");
        assert_eq!(claim.secret_block, secret_block);
        assert_eq!(claim.signature, expected);
    }

    #[test]
    fn should_send_public_value_as_hex() {
        let client = SrpClient::with_private_value(BigUint::from(1_u8)).expect("client");

        assert_eq!(client.public_value_hex(), "2");
    }
}
