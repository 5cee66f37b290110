use std::env;
use std::process::ExitCode;

use twofactor::qrcode::{read_provisioning_from_file, render_png, render_terminal};
use twofactor::{Authenticator, Config, Outcome, SecretStore, SqliteStore};

fn main() -> anyhow::Result<ExitCode> {
    env_logger::init();

    let args = env::args().collect::<Vec<_>>();

    if args.len() < 2 {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load()?;
    let store = SqliteStore::open(&config.database)?;
    let auth = Authenticator::new(config.service()?, store);

    match args[1].as_str() {
        "register" => {
            if args.len() < 3 {
                eprintln!("❌ Usage: twofactor register <account> [png_path]");
                return Ok(ExitCode::FAILURE);
            }

            let account = &args[2];
            let registration = auth.service().register(account)?;
            auth.store()
                .save_with_issuer(account, &registration.secret, Some(auth.service().issuer()))?;

            println!("✅ Registered {account}");
            println!("Scan this QR code with your authenticator app:");
            println!("{}", render_terminal(&registration.uri)?);
            println!("{}", registration.uri);

            if let Some(png_path) = args.get(3) {
                std::fs::write(png_path, render_png(&registration.uri)?)?;
                println!("🖼️  QR code written to {png_path}");
            }
        }
        "login" => {
            if args.len() < 4 {
                eprintln!("❌ Usage: twofactor login <account> <code>");
                return Ok(ExitCode::FAILURE);
            }

            let account = &args[2];
            match auth.verify_login(account, &args[3])? {
                Outcome::Verified => println!("✅ Login successful for {account}"),
                Outcome::RejectedBadCode => {
                    eprintln!("❌ Invalid 2FA code");
                    return Ok(ExitCode::FAILURE);
                }
                Outcome::RejectedMissingSecret => {
                    eprintln!("❌ No second factor on file for {account}, register first");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        "code" => {
            if args.len() < 3 {
                eprintln!("❌ Usage: twofactor code <account>");
                return Ok(ExitCode::FAILURE);
            }

            let account = &args[2];
            match auth.store().load(account)? {
                Some(secret) => {
                    let totp = auth.service().totp();
                    let code = totp.code_now(secret.as_bytes())?;
                    let remaining = totp.time_remaining()?;

                    println!("🔑 {account} | Code: {code} | Expires in: {remaining}s");
                }
                None => {
                    eprintln!("❌ Account not found: {account}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        "import" => {
            if args.len() < 3 {
                eprintln!("❌ Usage: twofactor import <image_path> [account]");
                return Ok(ExitCode::FAILURE);
            }

            let provisioning = match read_provisioning_from_file(&args[2]) {
                Ok(provisioning) => provisioning,
                Err(e) => {
                    eprintln!("❌ Error reading provisioning QR code: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };

            let totp = auth.service().totp();
            if provisioning.algorithm != totp.algorithm()
                || provisioning.digits != totp.digits()
                || provisioning.period != totp.time_step()
            {
                eprintln!(
                    "⚠️  QR code uses {} / {} digits / {}s, configured {} / {} digits / {}s",
                    provisioning.algorithm,
                    provisioning.digits,
                    provisioning.period,
                    totp.algorithm(),
                    totp.digits(),
                    totp.time_step()
                );
            }

            let account = args.get(3).unwrap_or(&provisioning.account);
            let issuer = (!provisioning.issuer.is_empty()).then_some(provisioning.issuer.as_str());
            auth.store()
                .save_with_issuer(account, &provisioning.secret, issuer)?;
            println!("✅ Imported {account}");
        }
        "list" => {
            let accounts = auth.store().list_accounts()?;

            if accounts.is_empty() {
                println!("📭 No accounts registered");
                return Ok(ExitCode::SUCCESS);
            }

            println!("📋 Accounts:");
            println!("============");

            for record in accounts {
                println!("🔑 {}", record.account);
                if let Some(issuer) = record.issuer {
                    println!("   Issuer: {issuer}");
                }
                println!("   Created: {}", record.created_at);
                println!();
            }
        }
        "delete" => {
            if args.len() < 3 {
                eprintln!("❌ Usage: twofactor delete <account>");
                return Ok(ExitCode::FAILURE);
            }

            let account = &args[2];
            if auth.store().delete(account)? {
                println!("✅ Deleted account: {account}");
            } else {
                eprintln!("❌ Account not found: {account}");
                return Ok(ExitCode::FAILURE);
            }
        }
        _ => {
            eprintln!("❌ Unknown command: {}", args[1]);
            print_usage();
            return Ok(ExitCode::FAILURE);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    println!("🔐 Two-factor console");
    println!("Usage: twofactor <command> [args]");
    println!();
    println!("Commands:");
    println!("  register <account> [png_path]    Provision a new secret and show its QR code");
    println!("  login <account> <code>           Check a one-time code for an account");
    println!("  code <account>                   Print the current code for an account");
    println!("  import <image_path> [account]    Import a secret from a provisioning QR code");
    println!("  list                             List registered accounts");
    println!("  delete <account>                 Delete an account's secret");
    println!();
    println!("Configuration:");
    println!("  Create a `twofactor.json` file, for example:");
    println!("  {{");
    println!("    \"issuer\": \"Acme\",");
    println!("    \"database\": \"twofactor.db\",");
    println!("    \"algorithm\": \"SHA1\",");
    println!("    \"digits\": 6,");
    println!("    \"period\": 30,");
    println!("    \"window\": 1,");
    println!("    \"secret_bytes\": 20");
    println!("  }}");
    println!();
    println!("Environment Variables (when no config file is present):");
    println!("  TWOFACTOR_ISSUER, TWOFACTOR_DB, TWOFACTOR_ALGORITHM, TWOFACTOR_DIGITS,");
    println!("  TWOFACTOR_PERIOD, TWOFACTOR_WINDOW, TWOFACTOR_SECRET_BYTES");
    println!("  RUST_LOG                         Log level (e.g. debug)");
    println!();
    println!("Examples:");
    println!("  twofactor register alice alice.png");
    println!("  twofactor login alice 123456");
    println!("  twofactor code alice");
}
