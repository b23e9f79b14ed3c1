//! Prints an argon2 PHC string for `ADMIN_PASSWORD_HASH`.
//!
//! Usage: `hash-password <password>` or pipe the password on stdin.

use argon2::{
	password_hash::{PasswordHasher, SaltString},
	Argon2,
};
use rand_core::OsRng;
use std::io::{self, BufRead};

fn main() {
	let password = match std::env::args().nth(1) {
		Some(password) => password,
		None => {
			let mut line = String::new();
			if let Err(e) = io::stdin().lock().read_line(&mut line) {
				eprintln!("🔥 Failed to read password: {e}");
				std::process::exit(1);
			}
			line.trim_end_matches(['\r', '\n']).to_string()
		}
	};

	if password.is_empty() {
		eprintln!("🔥 Password must not be empty");
		std::process::exit(1);
	}

	let salt = SaltString::generate(&mut OsRng);
	match Argon2::default().hash_password(password.as_bytes(), &salt) {
		Ok(hash) => println!("{hash}"),
		Err(e) => {
			eprintln!("🔥 Failed to hash password: {e}");
			std::process::exit(1);
		}
	}
}
