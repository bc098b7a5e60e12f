//! Account-structure export: flatten the campaign tree to rows per ad.

use adpull_core::{AccountId, AdpullResult};
use adpull_insights::{parse_labels, Ad, AdAccount, AdLabel, AdSet, Campaign, GraphClient, Paged};
use adpull_storage::{write_account_structure, AccountStructureRow};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Downloads and writes the account-structure export for all accounts.
pub async fn export_account_structure(
    client: &GraphClient,
    data_dir: &Path,
    accounts: &[AdAccount],
) -> AdpullResult<PathBuf> {
    let mut rows = Vec::new();
    for account in accounts {
        let account_id = AccountId::new(account.account_id.as_str());
        info!(account = %account_id, "downloading account structure");
        let campaigns = client.campaigns(&account_id).await?;
        let ad_sets = client.ad_sets(&account_id).await?;
        let ads = client.ads(&account_id).await?;
        rows.extend(build_structure_rows(account, &campaigns, &ad_sets, &ads)?);
    }
    write_account_structure(data_dir, &rows).await
}

/// Flattens one account's campaign tree into one export row per ad,
/// merging `{key=value}` label attributes from campaign, ad set, and ad
/// (innermost wins).
pub fn build_structure_rows(
    account: &AdAccount,
    campaigns: &[Campaign],
    ad_sets: &[AdSet],
    ads: &[Ad],
) -> AdpullResult<Vec<AccountStructureRow>> {
    let campaigns_by_id: HashMap<&str, &Campaign> =
        campaigns.iter().map(|c| (c.id.as_str(), c)).collect();
    let ad_sets_by_id: HashMap<&str, &AdSet> =
        ad_sets.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut rows = Vec::with_capacity(ads.len());
    for ad in ads {
        let Some(ad_set) = ad_sets_by_id.get(ad.adset_id.as_str()) else {
            warn!(ad = %ad.id, ad_set = %ad.adset_id, "ad references unknown ad set, skipping");
            continue;
        };
        let Some(campaign) = campaigns_by_id.get(ad_set.campaign_id.as_str()) else {
            warn!(ad = %ad.id, campaign = %ad_set.campaign_id,
                  "ad set references unknown campaign, skipping");
            continue;
        };

        let mut attributes: BTreeMap<String, String> = parse_labels(labels_of(&campaign.adlabels));
        attributes.extend(parse_labels(labels_of(&ad_set.adlabels)));
        attributes.extend(parse_labels(labels_of(&ad.adlabels)));

        rows.push(AccountStructureRow {
            ad_id: ad.id.clone(),
            ad_name: ad.name.clone(),
            ad_set_id: ad_set.id.clone(),
            ad_set_name: ad_set.name.clone(),
            campaign_id: campaign.id.clone(),
            campaign_name: campaign.name.clone(),
            account_id: account.account_id.clone(),
            account_name: account.name.clone().unwrap_or_default(),
            attributes: serde_json::to_string(&attributes)?,
        });
    }
    Ok(rows)
}

fn labels_of(labels: &Option<Paged<AdLabel>>) -> &[AdLabel] {
    labels.as_ref().map_or(&[], |page| page.data.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn account() -> AdAccount {
        serde_json::from_value(json!({
            "account_id": "123",
            "name": "Main"
        }))
        .expect("valid account")
    }

    fn campaign(id: &str, label: Option<&str>) -> Campaign {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("campaign-{id}"),
            "adlabels": label.map(|l| json!({ "data": [{ "name": l }] }))
        }))
        .expect("valid campaign")
    }

    fn ad_set(id: &str, campaign_id: &str, label: Option<&str>) -> AdSet {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("adset-{id}"),
            "campaign_id": campaign_id,
            "adlabels": label.map(|l| json!({ "data": [{ "name": l }] }))
        }))
        .expect("valid ad set")
    }

    fn ad(id: &str, adset_id: &str, label: Option<&str>) -> Ad {
        serde_json::from_value(json!({
            "id": id,
            "name": format!("ad-{id}"),
            "adset_id": adset_id,
            "adlabels": label.map(|l| json!({ "data": [{ "name": l }] }))
        }))
        .expect("valid ad")
    }

    #[test]
    fn test_flattens_tree_to_one_row_per_ad() {
        let rows = build_structure_rows(
            &account(),
            &[campaign("30", None)],
            &[ad_set("20", "30", None)],
            &[ad("10", "20", None), ad("11", "20", None)],
        )
        .expect("rows build");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].campaign_name, "campaign-30");
        assert_eq!(rows[0].account_id, "123");
    }

    #[test]
    fn test_inner_labels_override_outer() {
        let rows = build_structure_rows(
            &account(),
            &[campaign("30", Some("{channel=social}"))],
            &[ad_set("20", "30", Some("{channel=display}"))],
            &[ad("10", "20", None)],
        )
        .expect("rows build");
        assert!(rows[0].attributes.contains("display"));
        assert!(!rows[0].attributes.contains("social"));
    }

    #[test]
    fn test_orphaned_ads_are_skipped() {
        let rows = build_structure_rows(
            &account(),
            &[campaign("30", None)],
            &[],
            &[ad("10", "missing", None)],
        )
        .expect("rows build");
        assert!(rows.is_empty());
    }
}
