//! # ランダムパスワード生成
//!
//! `random-password` 方針でユーザーを作成する際のパスワードを生成する。
//! Cognito のデフォルトのパスワードポリシー（小文字・大文字・数字・記号を
//! 各 1 文字以上）を満たす。

use rand::{Rng as _, seq::SliceRandom as _};

/// 生成するパスワードの長さ
pub const PASSWORD_LENGTH: usize = 20;

const LOWERCASE: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+";

/// パスワード生成を担当するトレイト
pub trait PasswordGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// スレッドローカル乱数による [`PasswordGenerator`] の実装
#[derive(Debug, Default)]
pub struct RandomPasswordGenerator;

impl RandomPasswordGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordGenerator for RandomPasswordGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::rng();
        let classes = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];
        let all = classes.concat();

        // 各文字種から 1 文字ずつ確保してから残りを埋める
        let mut bytes: Vec<u8> = classes
            .iter()
            .map(|class| class[rng.random_range(0..class.len())])
            .collect();
        while bytes.len() < PASSWORD_LENGTH {
            bytes.push(all[rng.random_range(0..all.len())]);
        }
        bytes.shuffle(&mut rng);

        bytes.into_iter().map(char::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_生成したパスワードは全文字種を含む(#[values(0, 1, 2, 3, 4)] _attempt: u8) {
        let password = RandomPasswordGenerator::new().generate();

        assert_eq!(password.len(), PASSWORD_LENGTH);
        assert!(password.bytes().any(|b| LOWERCASE.contains(&b)));
        assert!(password.bytes().any(|b| UPPERCASE.contains(&b)));
        assert!(password.bytes().any(|b| DIGITS.contains(&b)));
        assert!(password.bytes().any(|b| SYMBOLS.contains(&b)));
    }

    #[test]
    fn test_生成したパスワードは許可された文字のみで構成される() {
        let password = RandomPasswordGenerator::new().generate();
        let all = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS].concat();

        assert!(password.bytes().all(|b| all.contains(&b)));
    }

    #[test]
    fn test_生成するたびに異なるパスワードになる() {
        let generator = RandomPasswordGenerator::new();
        assert_ne!(generator.generate(), generator.generate());
    }
}
