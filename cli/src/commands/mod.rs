mod aisle;
mod helpers;
mod history;
mod list;
mod offer;
mod product;
mod show;
mod transfer;

pub(crate) use aisle::{cmd_aisle_add, cmd_aisle_delete, cmd_aisle_list, cmd_aisle_reorder};
pub(crate) use history::{cmd_forget, cmd_frequent, cmd_suggest};
pub(crate) use list::{
    cmd_list_archive, cmd_list_create, cmd_list_delete, cmd_list_rename, cmd_list_select,
    cmd_list_show, cmd_list_unarchive,
};
pub(crate) use offer::{cmd_offer_add, cmd_offer_delete, cmd_offer_list};
pub(crate) use product::{cmd_add, cmd_clear, cmd_remove, cmd_toggle, cmd_update};
pub(crate) use show::cmd_show;
pub(crate) use transfer::{cmd_export, cmd_import};
